//! Error types for identifier parsing.

use thiserror::Error;

/// A result type using `IdError`.
pub type Result<T> = std::result::Result<T, IdError>;

/// Errors that can occur when constructing or parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// A natural key was empty.
    #[error("identifier must not be empty")]
    Empty,

    /// The input string contains invalid hexadecimal characters.
    #[error("invalid hex encoding: {0:?}")]
    InvalidHex(String),

    /// The input has an incorrect length.
    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength {
        /// The expected length.
        expected: usize,
        /// The actual length.
        got: usize,
    },
}
