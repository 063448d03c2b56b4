//! `RocksDB` document store for migrated bastion records.
//!
//! This crate provides the destination of a migration: a key-value document
//! store in which each record is addressed by its natural or derived key.
//!
//! # Architecture
//!
//! The storage uses one column family per record kind:
//!
//! - `users`: keyed by account name
//! - `keys`: keyed by fingerprint
//! - `nodes`: keyed by hostname
//! - `grants`: keyed by the 32-byte derived grant id
//! - `sessions`: keyed by the big-endian session number
//!
//! Values are CBOR-encoded. Every write is an upsert.
//!
//! # Example
//!
//! ```no_run
//! use bastion_migrate_store::{RocksStore, Store};
//! use bastion_migrate_core::{Account, RecordKind};
//!
//! let store = RocksStore::open("/tmp/bastion-db").unwrap();
//!
//! let alice = Account::new("alice").unwrap();
//! let user = store.get_user(&alice).unwrap();
//! let keys = store.count(RecordKind::Key).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
pub mod rocks;
pub mod schema;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use types::{Grant, Key, KeySource, Node, NodeSource, Session, User};

use bastion_migrate_core::{Account, GrantId, RecordKind, SessionId};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert or replace a user record, keyed by account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_user(&self, user: &User) -> Result<()>;

    /// Get a user by account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, account: &Account) -> Result<Option<User>>;

    // =========================================================================
    // Key Operations
    // =========================================================================

    /// Insert or replace a key record, keyed by fingerprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_key(&self, key: &Key) -> Result<()>;

    /// Get a key by fingerprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_key(&self, fingerprint: &str) -> Result<Option<Key>>;

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Insert or replace a node record, keyed by hostname.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_node(&self, node: &Node) -> Result<()>;

    /// Get a node by hostname.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_node(&self, hostname: &str) -> Result<Option<Node>>;

    // =========================================================================
    // Grant Operations
    // =========================================================================

    /// Insert or replace a grant record, keyed by its derived id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_grant(&self, grant: &Grant) -> Result<()>;

    /// Get a grant by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_grant(&self, id: &GrantId) -> Result<Option<Grant>>;

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Insert or replace a session record, keyed by session number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_session(&self, session: &Session) -> Result<()>;

    /// Get a session by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_session(&self, id: SessionId) -> Result<Option<Session>>;

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Count the records of one kind.
    ///
    /// This walks the whole column family; use it for reporting, not in loops.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn count(&self, kind: RecordKind) -> Result<u64>;
}
