//! End-to-end migrations from a legacy SQLite file into a RocksDB store.

use std::fs;
use std::path::{Path, PathBuf};

use bastion_migrate::{
    Aborted, Account, GrantId, MigrateConfig, Migration, MigrationReport, RecordKind, SessionId,
    Stage,
};
use bastion_migrate_legacy::SqliteReader;
use bastion_migrate_store::{KeySource, NodeSource, RocksStore, Store};
use rusqlite::Connection;
use tempfile::TempDir;
use walkdir::WalkDir;

const SCHEMA: &str = "
    CREATE TABLE users (id INTEGER PRIMARY KEY, created_at DATETIME, updated_at DATETIME,
        deleted_at DATETIME, account TEXT, password_digest TEXT, is_admin INTEGER,
        is_blocked INTEGER, used_at DATETIME);
    CREATE TABLE keys (id INTEGER PRIMARY KEY, created_at DATETIME, updated_at DATETIME,
        deleted_at DATETIME, user_id INTEGER, name TEXT, fingerprint TEXT,
        is_sandbox INTEGER, used_at DATETIME);
    CREATE TABLE servers (id INTEGER PRIMARY KEY, created_at DATETIME, updated_at DATETIME,
        deleted_at DATETIME, name TEXT, address TEXT, is_auto INTEGER, used_at DATETIME);
    CREATE TABLE grants (id INTEGER PRIMARY KEY, created_at DATETIME, updated_at DATETIME,
        deleted_at DATETIME, user_id INTEGER, server_name TEXT, target_user TEXT,
        expires_at DATETIME);
    CREATE TABLE sessions (id INTEGER PRIMARY KEY, created_at DATETIME, updated_at DATETIME,
        deleted_at DATETIME, user_account TEXT, command TEXT, ended_at DATETIME,
        is_recorded INTEGER);
";

struct Fixture {
    dir: TempDir,
    config: MigrateConfig,
}

impl Fixture {
    fn new(rows: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let config = MigrateConfig {
            legacy_db: dir.path().join("database.sqlite3"),
            legacy_replays: dir.path().join("bunker-replays"),
            store: dir.path().join("database.rocksdb"),
            replays: dir.path().join("bastion-replays"),
            ..MigrateConfig::default()
        };

        let conn = Connection::open(&config.legacy_db).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(rows).unwrap();

        Self { dir, config }
    }

    fn write_replay(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.config.legacy_replays.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn reopen_store(&self) -> RocksStore {
        RocksStore::open(&self.config.store).unwrap()
    }
}

fn alice() -> Account {
    Account::new("alice").unwrap()
}

fn run(fixture: &Fixture) -> Result<MigrationReport, Aborted> {
    let reader = SqliteReader::open(&fixture.config.legacy_db).unwrap();
    let store = RocksStore::open(&fixture.config.store).unwrap();
    let result = Migration::new(&reader, &store, &fixture.config).run();
    store.flush().unwrap();
    result
}

fn file_count(root: &Path) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count()
}

#[test]
fn user_and_key_scenario() {
    let fixture = Fixture::new(
        "INSERT INTO users (id, created_at, updated_at, account, password_digest,
             is_admin, is_blocked, used_at)
         VALUES (1, '2018-01-01 00:00:00+00:00', '2018-01-02 00:00:00+00:00',
             'alice', 'digest', 1, 0, NULL);
         INSERT INTO keys (id, created_at, user_id, name, fingerprint, is_sandbox)
         VALUES (1, '2018-01-01 00:00:00+00:00', 1, 'laptop', 'AA:BB', 0);",
    );

    let report = run(&fixture).unwrap();
    assert_eq!((report.users, report.keys), (1, 1));

    let store = fixture.reopen_store();
    let user = store.get_user(&alice()).unwrap().unwrap();
    assert_eq!(user.account, alice());
    assert_eq!(user.viewed_at, 0);
    assert_eq!(user.created_at, 1_514_764_800);
    assert_eq!(user.updated_at, 1_514_851_200);
    assert!(user.is_admin);

    let key = store.get_key("AA:BB").unwrap().unwrap();
    assert_eq!(key.account, alice());
    assert_eq!(key.source, KeySource::Manual);
    assert_eq!(key.name, "laptop");
}

fn grant_rows(owner: i64) -> String {
    format!(
        "INSERT INTO users (id, created_at, updated_at, account, is_admin, is_blocked)
         VALUES (1, '2018-01-01 00:00:00', '2018-01-01 00:00:00', 'alice', 0, 0);
         INSERT INTO servers (id, created_at, name, address, is_auto)
         VALUES (1, '2018-01-01 00:00:00', 'web-1', '10.0.0.1:22', 1);
         INSERT INTO grants (id, created_at, user_id, server_name, target_user)
         VALUES (1, '2018-01-01 00:00:00', {owner}, 'web-*', 'deploy');"
    )
}

#[test]
fn grant_scenario() {
    let fixture = Fixture::new(&grant_rows(1));
    let report = run(&fixture).unwrap();
    assert_eq!((report.users, report.nodes, report.grants), (1, 1, 1));

    let store = fixture.reopen_store();
    let id = GrantId::derive(&alice(), "web-*", "deploy");
    let grant = store.get_grant(&id).unwrap().unwrap();
    assert_eq!(grant.account, alice());
    assert_eq!(grant.hostname_pattern, "web-*");
    assert_eq!(grant.user, "deploy");
    assert_eq!(grant.expired_at, 0);

    let node = store.get_node("web-1").unwrap().unwrap();
    assert_eq!(node.user, "root");
    assert_eq!(node.address, "10.0.0.1:22");
    assert_eq!(node.source, NodeSource::Discovered);
}

#[test]
fn grant_with_missing_owner_aborts() {
    let fixture = Fixture::new(&grant_rows(2));
    let aborted = run(&fixture).unwrap_err();
    assert_eq!(aborted.stage, Stage::Grants);
    assert!(aborted.error.is_integrity());
    assert_eq!(aborted.report.grants, 0);

    let store = fixture.reopen_store();
    assert_eq!(store.count(RecordKind::Grant).unwrap(), 0);
    assert_eq!(store.count(RecordKind::User).unwrap(), 1);
    assert_eq!(store.count(RecordKind::Node).unwrap(), 1);
    assert!(!fixture.config.replays.exists());
}

#[test]
fn archive_scenario() {
    let fixture = Fixture::new(
        "INSERT INTO sessions (id, created_at, user_account, command, ended_at, is_recorded)
         VALUES (6699, '2018-01-01 00:00:00', 'alice', 'ssh web-1',
             '2018-01-01 00:05:00', 1);",
    );
    let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
    fixture.write_replay("2018/01/01/1a2b", &payload);

    let report = run(&fixture).unwrap();
    assert_eq!(report.sessions, 1);
    assert_eq!(report.archives, 1);
    assert_eq!(report.archive_bytes, payload.len() as u64);

    let id = SessionId::new(0x1a2b);
    let dest = fixture.config.layout.path_for(&fixture.config.replays, id);
    assert_eq!(
        dest,
        fixture
            .dir
            .path()
            .join("bastion-replays/2b/1a/00/0000000000001a2b")
    );
    assert_eq!(fs::read(&dest).unwrap(), payload);
    assert_eq!(
        fixture
            .config
            .layout
            .session_id_for(&fixture.config.replays, &dest),
        Some(id)
    );

    let store = fixture.reopen_store();
    let session = store.get_session(id).unwrap().unwrap();
    assert_eq!(session.finished_at, 1_514_765_100);
    assert!(session.is_recorded);
}

#[test]
fn many_archives_land_in_distinct_files() {
    let fixture = Fixture::new("");
    for id in 1..=300u32 {
        let name = format!("{id:x}");
        let shard = id % 7;
        fixture.write_replay(&format!("a/{shard}/b/{name}"), name.as_bytes());
    }

    let report = run(&fixture).unwrap();
    assert_eq!(report.archives, 300);
    assert_eq!(file_count(&fixture.config.replays), 300);

    for id in [1u32, 0xff, 0x100, 300] {
        let dest = fixture
            .config
            .layout
            .path_for(&fixture.config.replays, SessionId::new(i64::from(id)));
        assert_eq!(fs::read(dest).unwrap(), format!("{id:x}").as_bytes());
    }
}

#[test]
fn soft_deleted_rows_are_skipped() {
    let fixture = Fixture::new(
        "INSERT INTO users (id, created_at, updated_at, deleted_at, account, is_admin, is_blocked)
         VALUES (1, '2018-01-01 00:00:00', '2018-01-01 00:00:00', '2018-06-01 00:00:00',
             'gone', 0, 0);
         INSERT INTO keys (id, created_at, user_id, name, fingerprint, is_sandbox)
         VALUES (1, '2018-01-01 00:00:00', 1, 'old', 'AA:BB', 1);",
    );

    let aborted = run(&fixture).unwrap_err();
    assert_eq!(aborted.stage, Stage::Keys);
    assert!(aborted.error.is_integrity());
    assert_eq!(aborted.report.users, 0);
}

#[test]
fn legacy_database_is_untouched() {
    let fixture = Fixture::new(
        "INSERT INTO users (id, created_at, updated_at, account, is_admin, is_blocked)
         VALUES (1, '2018-01-01 00:00:00', '2018-01-01 00:00:00', 'alice', 0, 0);",
    );
    let replay = fixture.write_replay("x/y/z/ff", b"bytes");
    let before = fs::read(&fixture.config.legacy_db).unwrap();

    run(&fixture).unwrap();

    assert_eq!(fs::read(&fixture.config.legacy_db).unwrap(), before);
    assert_eq!(fs::read(replay).unwrap(), b"bytes");
}
