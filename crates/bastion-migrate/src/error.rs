//! Error types for the migration engine.
//!
//! Every error here is fatal: the driver stops at the first one and reports
//! it together with the stage it happened in.

use std::io;
use std::path::PathBuf;

use bastion_migrate_core::{IdError, RecordKind, SessionId};
use bastion_migrate_legacy::LegacyError;
use bastion_migrate_store::StoreError;
use thiserror::Error;

/// A result type using `MigrateError`.
pub type Result<T> = std::result::Result<T, MigrateError>;

/// A required cross-reference or identity could not be established.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// A record references a legacy user id that does not exist.
    #[error("{kind} {legacy_id} references missing user id {user_id}")]
    MissingUser {
        /// Kind of the referencing record.
        kind: RecordKind,
        /// Legacy primary key of the referencing record.
        legacy_id: i64,
        /// The dangling user id.
        user_id: i64,
    },

    /// A field that becomes part of a key in the new schema is empty.
    #[error("{kind} {legacy_id} has an empty {field}")]
    MissingField {
        /// Kind of the record.
        kind: RecordKind,
        /// Legacy primary key of the record.
        legacy_id: i64,
        /// Name of the empty field.
        field: &'static str,
    },

    /// A legacy replay file name is not a base-16 session id.
    #[error("archive file name is not a session id: {path}")]
    InvalidArchiveName {
        /// The offending file.
        path: PathBuf,
        /// Why the name was rejected.
        #[source]
        source: IdError,
    },

    /// Something other than a regular file sits where an archive belongs.
    #[error("archive path is not a regular file: {path}")]
    NotAFile {
        /// The offending entry.
        path: PathBuf,
    },

    /// Two legacy replay files name the same session.
    #[error("session {session_id} has two archives: {first} and {second}")]
    DuplicateArchive {
        /// The session both files claim.
        session_id: SessionId,
        /// The file found first.
        first: PathBuf,
        /// The file found second.
        second: PathBuf,
    },
}

/// Errors that abort a migration.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A referential or identity check failed.
    #[error("integrity violation: {0}")]
    Integrity(#[from] IntegrityError),

    /// A file-tree operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Reading the legacy store failed.
    #[error("legacy store error: {0}")]
    Legacy(#[from] LegacyError),

    /// Writing the new store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MigrateError {
    /// Build an `Io` error for `path`.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// Returns true if this is an integrity violation rather than an access failure.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_classification() {
        let missing = MigrateError::from(IntegrityError::MissingUser {
            kind: RecordKind::Key,
            legacy_id: 7,
            user_id: 99,
        });
        assert!(missing.is_integrity());
        assert_eq!(
            missing.to_string(),
            "integrity violation: key 7 references missing user id 99"
        );

        let io = MigrateError::io("/tmp/x")(io::Error::from(io::ErrorKind::NotFound));
        assert!(!io.is_integrity());
        assert!(io.to_string().starts_with("I/O error at /tmp/x"));
    }
}
