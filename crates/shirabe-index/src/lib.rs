//! # shirabe-index
//!
//! Binary container attaching typed index blobs to a dictionary file.
//!
//! ```text
//! header   magic:i32 = 0x4A474958  version:i32 = 1000  first_record:i32 = 16  byte_order:i32
//! record   type:i32  length:i32  data_offset:i32 = 12  payload[length]
//! ```
//!
//! Header and record prefixes are stored big-endian. The byte-order field
//! (`1` big-endian, `2` little-endian) records the host order at creation time
//! and tells readers how to decode the payloads.
pub mod container;
pub mod data;
pub mod error;

#[cfg(test)]
mod tests;

pub use container::{ContainerMode, EXTENSION, FileIndexContainer, MAGIC, VERSION};
pub use data::{IndexByteOrder, IndexData};
pub use error::{IndexError, Result};
