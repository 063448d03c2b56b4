//! In-memory storage implementation for tests.

use std::collections::BTreeMap;

use bastion_migrate_core::{Account, GrantId, RecordKind, SessionId};
use parking_lot::RwLock;

use crate::error::Result;
use crate::types::{Grant, Key, Node, Session, User};
use crate::Store;

#[derive(Default)]
struct Tables {
    users: BTreeMap<Account, User>,
    keys: BTreeMap<String, Key>,
    nodes: BTreeMap<String, Node>,
    grants: BTreeMap<GrantId, Grant>,
    sessions: BTreeMap<SessionId, Session>,
}

/// A `Store` backed by ordered maps behind a lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn put_user(&self, user: &User) -> Result<()> {
        self.tables
            .write()
            .users
            .insert(user.account.clone(), user.clone());
        Ok(())
    }

    fn get_user(&self, account: &Account) -> Result<Option<User>> {
        Ok(self.tables.read().users.get(account).cloned())
    }

    fn put_key(&self, key: &Key) -> Result<()> {
        self.tables
            .write()
            .keys
            .insert(key.fingerprint.clone(), key.clone());
        Ok(())
    }

    fn get_key(&self, fingerprint: &str) -> Result<Option<Key>> {
        Ok(self.tables.read().keys.get(fingerprint).cloned())
    }

    fn put_node(&self, node: &Node) -> Result<()> {
        self.tables
            .write()
            .nodes
            .insert(node.hostname.clone(), node.clone());
        Ok(())
    }

    fn get_node(&self, hostname: &str) -> Result<Option<Node>> {
        Ok(self.tables.read().nodes.get(hostname).cloned())
    }

    fn put_grant(&self, grant: &Grant) -> Result<()> {
        self.tables.write().grants.insert(grant.id, grant.clone());
        Ok(())
    }

    fn get_grant(&self, id: &GrantId) -> Result<Option<Grant>> {
        Ok(self.tables.read().grants.get(id).cloned())
    }

    fn put_session(&self, session: &Session) -> Result<()> {
        self.tables
            .write()
            .sessions
            .insert(session.id, session.clone());
        Ok(())
    }

    fn get_session(&self, id: SessionId) -> Result<Option<Session>> {
        Ok(self.tables.read().sessions.get(&id).cloned())
    }

    fn count(&self, kind: RecordKind) -> Result<u64> {
        let tables = self.tables.read();
        let len = match kind {
            RecordKind::User => tables.users.len(),
            RecordKind::Key => tables.keys.len(),
            RecordKind::Node => tables.nodes.len(),
            RecordKind::Grant => tables.grants.len(),
            RecordKind::Session => tables.sessions.len(),
        };
        Ok(len as u64)
    }
}
