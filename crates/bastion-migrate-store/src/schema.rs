//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

use bastion_migrate_core::RecordKind;

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User records, keyed by account.
    pub const USERS: &str = "users";

    /// Key records, keyed by fingerprint.
    pub const KEYS: &str = "keys";

    /// Node records, keyed by hostname.
    pub const NODES: &str = "nodes";

    /// Grant records, keyed by `grant_id`.
    pub const GRANTS: &str = "grants";

    /// Session records, keyed by big-endian `session_id`.
    pub const SESSIONS: &str = "sessions";
}

/// Returns the column family holding records of `kind`.
#[must_use]
pub const fn column_family(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::User => cf::USERS,
        RecordKind::Key => cf::KEYS,
        RecordKind::Node => cf::NODES,
        RecordKind::Grant => cf::GRANTS,
        RecordKind::Session => cf::SESSIONS,
    }
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    RecordKind::ALL.into_iter().map(column_family).collect()
}
