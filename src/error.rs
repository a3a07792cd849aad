//! Error types for ktdreader
//!
//! Provides a unified error type for all operations. A lookup that finds no
//! matching row is not an error: it is reported as `Ok(None)`.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using KtdError
pub type Result<T> = std::result::Result<T, KtdError>;

/// Unified error type for ktdreader operations
#[derive(Debug, Error)]
pub enum KtdError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reader is closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Corrupt block at offset {offset}: {reason}")]
    CorruptBlock { offset: u64, reason: String },

    #[error("Primary index slot {slot} out of range ({entries} entries)")]
    IndexOutOfRange { slot: u32, entries: u32 },

    // -------------------------------------------------------------------------
    // Query Errors
    // -------------------------------------------------------------------------
    #[error("No secondary key group contains field '{0}'")]
    UnknownSecondaryKey(String),

    #[error("Secondary key group {group} has no index")]
    MissingIndex { group: usize },

    #[error("Invalid line length width: {0} (expected 1 or 2)")]
    InvalidLineWidth(u8),
}

impl KtdError {
    pub(crate) fn corrupt_block(offset: u64, reason: impl Into<String>) -> Self {
        KtdError::CorruptBlock {
            offset,
            reason: reason.into(),
        }
    }
}
