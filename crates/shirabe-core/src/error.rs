use crate::dictionary::LoadError;
use crate::search::ParameterType;

/// Failures of format detection and dictionary construction
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No registered implementation gave the descriptor a positive confidence.
    /// `reasons` holds one `name:reason` line per implementation.
    #[error("Dictionary format not supported:\n{reasons}")]
    FormatNotSupported { reasons: String },

    #[error("Failed to instantiate {implementation} dictionary: {source}")]
    Instantiation {
        implementation: String,
        #[source]
        source: LoadError,
    },
}

/// Failures raised when running a search against a dictionary
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search mode '{0}' is not supported by this dictionary")]
    UnsupportedSearchMode(String),

    #[error("Invalid number of parameters: expected {expected}, found {found}")]
    ParameterCount { expected: usize, found: usize },

    #[error("Unknown search field '{0}'")]
    UnknownField(String),

    #[error("Invalid type for parameter {index}: expected {expected}, found {found}")]
    ParameterType {
        index: usize,
        expected: ParameterType,
        found: ParameterType,
    },
}
