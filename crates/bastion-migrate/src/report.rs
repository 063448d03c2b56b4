//! Counters describing what a migration wrote.

use bastion_migrate_core::RecordKind;
use serde::{Deserialize, Serialize};

/// Per-kind record counts plus archive totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Users written.
    pub users: u64,
    /// Keys written.
    pub keys: u64,
    /// Nodes written.
    pub nodes: u64,
    /// Grants written.
    pub grants: u64,
    /// Sessions written.
    pub sessions: u64,
    /// Replay archives copied.
    pub archives: u64,
    /// Total bytes of replay archives copied.
    pub archive_bytes: u64,
}

impl MigrationReport {
    /// Count one written record of `kind`.
    pub fn record(&mut self, kind: RecordKind) {
        *self.slot(kind) += 1;
    }

    /// Count one copied archive of `bytes` bytes.
    pub fn archive(&mut self, bytes: u64) {
        self.archives += 1;
        self.archive_bytes += bytes;
    }

    /// Records of `kind` written so far.
    #[must_use]
    pub const fn count(&self, kind: RecordKind) -> u64 {
        match kind {
            RecordKind::User => self.users,
            RecordKind::Key => self.keys,
            RecordKind::Node => self.nodes,
            RecordKind::Grant => self.grants,
            RecordKind::Session => self.sessions,
        }
    }

    fn slot(&mut self, kind: RecordKind) -> &mut u64 {
        match kind {
            RecordKind::User => &mut self.users,
            RecordKind::Key => &mut self.keys,
            RecordKind::Node => &mut self.nodes,
            RecordKind::Grant => &mut self.grants,
            RecordKind::Session => &mut self.sessions,
        }
    }
}
