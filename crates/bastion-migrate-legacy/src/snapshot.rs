//! An in-memory legacy store.

use crate::error::Result;
use crate::types::{LegacyGrant, LegacyKey, LegacyNode, LegacySession, LegacyUser};
use crate::LegacyReader;

/// A fully materialized set of legacy records.
///
/// Records are returned in the order they were pushed, which stands in for
/// primary-key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacySnapshot {
    /// Rows of `users`.
    pub users: Vec<LegacyUser>,
    /// Rows of `keys`.
    pub keys: Vec<LegacyKey>,
    /// Rows of `servers`.
    pub nodes: Vec<LegacyNode>,
    /// Rows of `grants`.
    pub grants: Vec<LegacyGrant>,
    /// Rows of `sessions`.
    pub sessions: Vec<LegacySession>,
}

impl LegacyReader for LegacySnapshot {
    fn users(&self) -> Result<Vec<LegacyUser>> {
        Ok(self.users.clone())
    }

    fn keys(&self) -> Result<Vec<LegacyKey>> {
        Ok(self.keys.clone())
    }

    fn nodes(&self) -> Result<Vec<LegacyNode>> {
        Ok(self.nodes.clone())
    }

    fn grants(&self) -> Result<Vec<LegacyGrant>> {
        Ok(self.grants.clone())
    }

    fn sessions(&self) -> Result<Vec<LegacySession>> {
        Ok(self.sessions.clone())
    }
}
