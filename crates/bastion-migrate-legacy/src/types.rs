//! Legacy record types, one per legacy table.
//!
//! Flags are kept as the raw integers stored by the legacy schema; timestamps
//! are decoded to UTC.

use chrono::{DateTime, Utc};

/// A row of the legacy `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyUser {
    /// Numeric primary key.
    pub id: i64,
    /// Unique account name.
    pub account: String,
    /// Password digest, carried over opaque.
    pub password_digest: String,
    /// Non-zero if the user is blocked.
    pub is_blocked: i64,
    /// Non-zero if the user is an administrator.
    pub is_admin: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Last use, if the user ever logged in.
    pub used_at: Option<DateTime<Utc>>,
}

/// A row of the legacy `keys` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyKey {
    /// Numeric primary key.
    pub id: i64,
    /// Owning user, references `users.id`.
    pub user_id: i64,
    /// Key fingerprint.
    pub fingerprint: String,
    /// Non-zero if the key was generated for a sandbox.
    pub is_sandbox: i64,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last use, if any.
    pub used_at: Option<DateTime<Utc>>,
}

/// A row of the legacy `servers` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyNode {
    /// Numeric primary key.
    pub id: i64,
    /// Server name, becomes the node hostname.
    pub name: String,
    /// Network address.
    pub address: String,
    /// Non-zero if the server was auto-discovered.
    pub is_auto: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last use, if any.
    pub used_at: Option<DateTime<Utc>>,
}

/// A row of the legacy `grants` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyGrant {
    /// Numeric primary key. Not carried over.
    pub id: i64,
    /// Owning user, references `users.id`.
    pub user_id: i64,
    /// Server name pattern.
    pub server_name: String,
    /// Login user on the target server.
    pub target_user: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry, if the grant is temporary.
    pub expires_at: Option<DateTime<Utc>>,
}

/// A row of the legacy `sessions` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacySession {
    /// Numeric primary key, kept as the new session id.
    pub id: i64,
    /// Account name of the user, denormalized.
    pub user_account: String,
    /// Command line executed in the session.
    pub command: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// End of the session, if it ended.
    pub ended_at: Option<DateTime<Utc>>,
    /// Non-zero if a replay was recorded.
    pub is_recorded: i64,
}
