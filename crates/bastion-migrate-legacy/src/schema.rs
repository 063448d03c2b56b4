//! Legacy table and column names.
//!
//! Column lists are ordered to match the positional reads in `sqlite.rs`.

/// Table names in the legacy database.
pub mod table {
    /// User accounts.
    pub const USERS: &str = "users";
    /// SSH public keys.
    pub const KEYS: &str = "keys";
    /// Target servers, migrated as nodes.
    pub const SERVERS: &str = "servers";
    /// Access grants.
    pub const GRANTS: &str = "grants";
    /// Recorded sessions.
    pub const SESSIONS: &str = "sessions";
}

/// Columns read from `users`.
pub const USER_COLUMNS: &[&str] = &[
    "id",
    "account",
    "password_digest",
    "is_blocked",
    "is_admin",
    "created_at",
    "updated_at",
    "used_at",
];

/// Columns read from `keys`.
pub const KEY_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "fingerprint",
    "is_sandbox",
    "name",
    "created_at",
    "used_at",
];

/// Columns read from `servers`.
pub const SERVER_COLUMNS: &[&str] = &["id", "name", "address", "is_auto", "created_at", "used_at"];

/// Columns read from `grants`.
pub const GRANT_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "server_name",
    "target_user",
    "created_at",
    "expires_at",
];

/// Columns read from `sessions`.
pub const SESSION_COLUMNS: &[&str] = &[
    "id",
    "user_account",
    "command",
    "created_at",
    "ended_at",
    "is_recorded",
];

/// Soft-delete marker; rows with a non-null value are skipped.
pub const DELETED_AT: &str = "deleted_at";
