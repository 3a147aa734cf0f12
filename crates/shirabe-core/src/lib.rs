pub mod dictionary;
pub mod error;
pub mod preprocess;
pub mod registry;
pub mod search;
