use thiserror::Error;

use crate::container::ContainerMode;

/// Errors raised by index container operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad magic, unsupported version, or a record chain that does not end
    /// exactly at the end of the file.
    #[error("Corrupt index container: {0}")]
    Corruption(String),

    #[error("Operation '{operation}' is not allowed in {mode} mode")]
    IllegalMode {
        operation: &'static str,
        mode: ContainerMode,
    },

    #[error("No index data of type {0:#x} available")]
    IndexMissing(i32),

    #[error("Index data of type {0:#x} already exists")]
    IndexExists(i32),

    #[error("Index container is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, IndexError>;
