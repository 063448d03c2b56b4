//! Domain types stored in the database.
//!
//! These types represent the denormalized bastion schema. All timestamps are
//! Unix epoch seconds; zero means "never".

use std::fmt;

use bastion_migrate_core::{Account, GrantId, SessionId};
use serde::{Deserialize, Serialize};

/// A user record, keyed by account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique account name.
    pub account: Account,
    /// Password digest, opaque.
    pub password_digest: String,
    /// Display name.
    pub nickname: String,
    /// Whether the user is blocked from logging in.
    pub is_blocked: bool,
    /// Whether the user is an administrator.
    pub is_admin: bool,
    /// Creation timestamp.
    pub created_at: i64,
    /// Last modification timestamp.
    pub updated_at: i64,
    /// Last time the user was seen, or zero.
    pub viewed_at: i64,
}

/// Where a key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// Uploaded by the user.
    Manual,
    /// Generated for a sandbox.
    Sandbox,
}

impl KeySource {
    /// Lowercase name, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Sandbox => "sandbox",
        }
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key record, keyed by fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Key fingerprint.
    pub fingerprint: String,
    /// Owning user.
    pub account: Account,
    /// Origin of the key.
    pub source: KeySource,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: i64,
    /// Last use, or zero.
    pub viewed_at: i64,
}

/// Where a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSource {
    /// Added by an administrator.
    Manual,
    /// Registered by service discovery.
    Discovered,
}

impl NodeSource {
    /// Lowercase name, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Discovered => "discovered",
        }
    }
}

impl fmt::Display for NodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node record, keyed by hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Hostname.
    pub hostname: String,
    /// Network address.
    pub address: String,
    /// Login user on the node.
    pub user: String,
    /// Origin of the node.
    pub source: NodeSource,
    /// Creation timestamp.
    pub created_at: i64,
    /// Last use, or zero.
    pub viewed_at: i64,
}

impl Node {
    /// Login user assigned to every node.
    pub const DEFAULT_USER: &'static str = "root";
}

/// A grant record, keyed by its derived id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Content-derived identifier.
    pub id: GrantId,
    /// Grantee.
    pub account: Account,
    /// Hostname pattern the grant applies to.
    pub hostname_pattern: String,
    /// Login user on matching nodes.
    pub user: String,
    /// Creation timestamp.
    pub created_at: i64,
    /// Expiry, or zero if the grant never expires.
    pub expired_at: i64,
}

/// A session record, keyed by session number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session number, also the replay archive address.
    pub id: SessionId,
    /// Account that opened the session. Not checked against users.
    pub account: String,
    /// Command line executed.
    pub command: String,
    /// Creation timestamp.
    pub created_at: i64,
    /// End of the session, or zero.
    pub finished_at: i64,
    /// Whether a replay was recorded.
    pub is_recorded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_display_as_serialized() {
        assert_eq!(KeySource::Sandbox.to_string(), "sandbox");
        assert_eq!(NodeSource::Discovered.to_string(), "discovered");
        assert_eq!(NodeSource::Manual.as_str(), "manual");
    }
}
