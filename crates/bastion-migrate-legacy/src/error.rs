//! Error types for the legacy reader.

use std::path::PathBuf;

use thiserror::Error;

/// A result type using `LegacyError`.
pub type Result<T> = std::result::Result<T, LegacyError>;

/// Errors that can occur while reading the legacy store.
#[derive(Debug, Error)]
pub enum LegacyError {
    /// The database file could not be opened.
    #[error("failed to open legacy database {path}: {source}")]
    Open {
        /// Location of the database file.
        path: PathBuf,
        /// Underlying driver error.
        #[source]
        source: rusqlite::Error,
    },

    /// A query failed or a row could not be decoded.
    #[error("legacy query on `{table}` failed: {source}")]
    Query {
        /// Table being read.
        table: &'static str,
        /// Underlying driver error.
        #[source]
        source: rusqlite::Error,
    },
}
