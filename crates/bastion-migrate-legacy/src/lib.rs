//! Read-only access to a legacy bunker deployment's database.
//!
//! The legacy store is a normalized SQLite schema with numeric primary keys.
//! This crate exposes it through the [`LegacyReader`] trait, whose only
//! operation is "find all records of one kind".
//!
//! # Tables
//!
//! - `users`: accounts, keyed by numeric `id`
//! - `keys`: SSH keys, `user_id` references `users.id`
//! - `servers`: target nodes
//! - `grants`: access grants, `user_id` references `users.id`
//! - `sessions`: recorded sessions, `user_account` is free text
//!
//! # Example
//!
//! ```no_run
//! use bastion_migrate_legacy::{LegacyReader, SqliteReader};
//!
//! let reader = SqliteReader::open("database.sqlite3").unwrap();
//! for user in reader.users().unwrap() {
//!     println!("{} {}", user.id, user.account);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod schema;
pub mod snapshot;
pub mod sqlite;
pub mod time;
pub mod types;

pub use error::{LegacyError, Result};
pub use snapshot::LegacySnapshot;
pub use sqlite::SqliteReader;
pub use types::{LegacyGrant, LegacyKey, LegacyNode, LegacySession, LegacyUser};

/// Bulk, read-only access to the legacy records.
///
/// Every method returns the full set of records of one kind, ordered by
/// legacy primary key. Implementations never mutate the underlying store.
pub trait LegacyReader {
    /// Find all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    fn users(&self) -> Result<Vec<LegacyUser>>;

    /// Find all keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    fn keys(&self) -> Result<Vec<LegacyKey>>;

    /// Find all nodes (the legacy `servers` table).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    fn nodes(&self) -> Result<Vec<LegacyNode>>;

    /// Find all grants.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    fn grants(&self) -> Result<Vec<LegacyGrant>>;

    /// Find all sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    fn sessions(&self) -> Result<Vec<LegacySession>>;
}
