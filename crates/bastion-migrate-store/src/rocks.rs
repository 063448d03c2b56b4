//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use bastion_migrate_core::{Account, GrantId, RecordKind, SessionId};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf, column_family};
use crate::types::{Grant, Key, Node, Session, User};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Flush memtables to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a flush fails.
    pub fn flush(&self) -> Result<()> {
        for name in all_column_families() {
            let cf = self.cf(name)?;
            self.db
                .flush_cf(&cf)
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get a column family handle.
    fn cf(&self, name: &'static str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or(StoreError::MissingColumnFamily(name))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn put_record<T: Serialize>(
        &self,
        name: &'static str,
        key: &[u8],
        record: &T,
    ) -> Result<()> {
        let cf = self.cf(name)?;
        let value = Self::serialize(record)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_record<T: DeserializeOwned>(
        &self,
        name: &'static str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let cf = self.cf(name)?;

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }
}

impl Store for RocksStore {
    fn put_user(&self, user: &User) -> Result<()> {
        self.put_record(cf::USERS, &keys::user_key(&user.account), user)
    }

    fn get_user(&self, account: &Account) -> Result<Option<User>> {
        self.get_record(cf::USERS, &keys::user_key(account))
    }

    fn put_key(&self, key: &Key) -> Result<()> {
        self.put_record(cf::KEYS, &keys::fingerprint_key(&key.fingerprint), key)
    }

    fn get_key(&self, fingerprint: &str) -> Result<Option<Key>> {
        self.get_record(cf::KEYS, &keys::fingerprint_key(fingerprint))
    }

    fn put_node(&self, node: &Node) -> Result<()> {
        self.put_record(cf::NODES, &keys::node_key(&node.hostname), node)
    }

    fn get_node(&self, hostname: &str) -> Result<Option<Node>> {
        self.get_record(cf::NODES, &keys::node_key(hostname))
    }

    fn put_grant(&self, grant: &Grant) -> Result<()> {
        self.put_record(cf::GRANTS, &keys::grant_key(&grant.id), grant)
    }

    fn get_grant(&self, id: &GrantId) -> Result<Option<Grant>> {
        self.get_record(cf::GRANTS, &keys::grant_key(id))
    }

    fn put_session(&self, session: &Session) -> Result<()> {
        self.put_record(cf::SESSIONS, &keys::session_key(session.id), session)
    }

    fn get_session(&self, id: SessionId) -> Result<Option<Session>> {
        self.get_record(cf::SESSIONS, &keys::session_key(id))
    }

    fn count(&self, kind: RecordKind) -> Result<u64> {
        let cf = self.cf(column_family(kind))?;

        let mut count = 0u64;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            item.map_err(|e| StoreError::Database(e.to_string()))?;
            count += 1;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KeySource, NodeSource};
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn alice() -> Account {
        Account::new("alice").unwrap()
    }

    fn create_test_user(account: &Account) -> User {
        User {
            account: account.clone(),
            password_digest: "digest".to_string(),
            nickname: account.to_string(),
            is_blocked: false,
            is_admin: true,
            created_at: 1_514_764_800,
            updated_at: 1_514_764_800,
            viewed_at: 0,
        }
    }

    #[test]
    fn user_upsert_replaces() {
        let (store, _dir) = create_test_store();
        let mut user = create_test_user(&alice());

        store.put_user(&user).unwrap();
        user.viewed_at = 42;
        store.put_user(&user).unwrap();

        let retrieved = store.get_user(&alice()).unwrap().unwrap();
        assert_eq!(retrieved.viewed_at, 42);
        assert_eq!(store.count(RecordKind::User).unwrap(), 1);

        let bob = Account::new("bob").unwrap();
        assert!(store.get_user(&bob).unwrap().is_none());
    }

    #[test]
    fn key_and_node_crud() {
        let (store, _dir) = create_test_store();

        let key = Key {
            fingerprint: "AA:BB".to_string(),
            account: alice(),
            source: KeySource::Manual,
            name: "laptop".to_string(),
            created_at: 1,
            viewed_at: 0,
        };
        store.put_key(&key).unwrap();
        assert_eq!(store.get_key("AA:BB").unwrap(), Some(key));

        let node = Node {
            hostname: "web-1".to_string(),
            address: "10.0.0.1:22".to_string(),
            user: Node::DEFAULT_USER.to_string(),
            source: NodeSource::Discovered,
            created_at: 1,
            viewed_at: 2,
        };
        store.put_node(&node).unwrap();
        assert_eq!(store.get_node("web-1").unwrap(), Some(node));
        assert!(store.get_node("web-2").unwrap().is_none());
    }

    #[test]
    fn grant_and_session_crud() {
        let (store, _dir) = create_test_store();

        let grant = Grant {
            id: GrantId::derive(&alice(), "web-*", "deploy"),
            account: alice(),
            hostname_pattern: "web-*".to_string(),
            user: "deploy".to_string(),
            created_at: 1,
            expired_at: 0,
        };
        store.put_grant(&grant).unwrap();
        assert_eq!(store.get_grant(&grant.id).unwrap(), Some(grant));

        for id in [1, 2, 3] {
            let session = Session {
                id: SessionId::new(id),
                account: "ghost".to_string(),
                command: "ssh web-1".to_string(),
                created_at: 1,
                finished_at: 0,
                is_recorded: true,
            };
            store.put_session(&session).unwrap();
        }
        assert_eq!(store.count(RecordKind::Session).unwrap(), 3);
        assert_eq!(
            store.get_session(SessionId::new(2)).unwrap().unwrap().account,
            "ghost"
        );
        assert_eq!(store.count(RecordKind::Grant).unwrap(), 1);
        assert_eq!(store.count(RecordKind::Node).unwrap(), 0);
    }

    #[test]
    fn reopen_keeps_records() {
        let dir = TempDir::new().unwrap();
        {
            let store = RocksStore::open(dir.path()).unwrap();
            store.put_user(&create_test_user(&alice())).unwrap();
            store.flush().unwrap();
        }

        let store = RocksStore::open(dir.path()).unwrap();
        assert!(store.get_user(&alice()).unwrap().is_some());
    }

    #[test]
    fn unknown_column_family_is_reported() {
        let (store, _dir) = create_test_store();

        let err = store.put_record("accounts", b"alice", &1u8).unwrap_err();
        assert!(matches!(err, StoreError::MissingColumnFamily("accounts")));
        assert_eq!(err.to_string(), "column family not found: accounts");

        let err = store.get_record::<u8>("accounts", b"alice").unwrap_err();
        assert!(matches!(err, StoreError::MissingColumnFamily("accounts")));
    }
}
