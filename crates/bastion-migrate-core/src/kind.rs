//! The fixed set of record kinds carried across by a migration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A kind of record in the legacy and new stores.
///
/// The variants are declared in migration order: users must be imported
/// before the kinds that reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// User accounts.
    User,
    /// SSH public keys owned by users.
    Key,
    /// Target servers.
    Node,
    /// Access grants from a user to a hostname pattern.
    Grant,
    /// Recorded terminal sessions.
    Session,
}

impl RecordKind {
    /// All kinds, in migration order.
    pub const ALL: [Self; 5] = [Self::User, Self::Key, Self::Node, Self::Grant, Self::Session];

    /// Lowercase singular name, used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Key => "key",
            Self::Node => "node",
            Self::Grant => "grant",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
