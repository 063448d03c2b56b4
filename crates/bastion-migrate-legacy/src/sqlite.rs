//! `SQLite` implementation of the legacy reader.
//!
//! The database is opened read-only; no statement issued here writes.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, Row};
use tracing::debug;

use crate::error::{LegacyError, Result};
use crate::schema::{self, table};
use crate::time::LegacyTime;
use crate::types::{LegacyGrant, LegacyKey, LegacyNode, LegacySession, LegacyUser};
use crate::LegacyReader;

/// Read-only reader over a legacy `SQLite` database file.
pub struct SqliteReader {
    conn: Connection,
}

impl SqliteReader {
    /// Open an existing legacy database read-only.
    ///
    /// # Errors
    ///
    /// Returns `LegacyError::Open` if the file is missing or not a database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|source| LegacyError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { conn })
    }

    /// Check whether `table` has a column named `column`.
    fn has_column(&self, table: &'static str, column: &str) -> Result<bool> {
        let query_err = |source| LegacyError::Query { table, source };

        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info(\"{table}\")"))
            .map_err(query_err)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .map_err(query_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(query_err)?;

        Ok(names.iter().any(|name| name == column))
    }

    /// Select `columns` from every live row of `table`, ordered by `id`.
    fn select<T, F>(&self, table: &'static str, columns: &[&str], map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let query_err = |source| LegacyError::Query { table, source };

        let filter = if self.has_column(table, schema::DELETED_AT)? {
            format!(" WHERE \"{}\" IS NULL", schema::DELETED_AT)
        } else {
            String::new()
        };
        let sql = format!(
            "SELECT {} FROM \"{table}\"{filter} ORDER BY \"id\"",
            columns.join(", ")
        );

        let mut stmt = self.conn.prepare(&sql).map_err(query_err)?;
        let rows = stmt
            .query_map([], map)
            .map_err(query_err)?
            .collect::<rusqlite::Result<Vec<T>>>()
            .map_err(query_err)?;

        debug!(table, count = rows.len(), "loaded legacy rows");
        Ok(rows)
    }
}

/// Read a text cell, treating NULL as empty.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

/// Read an integer flag cell, treating NULL as zero.
fn flag(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or(0))
}

/// Read a required timestamp cell.
fn time(row: &Row<'_>, idx: usize) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    row.get::<_, LegacyTime>(idx).map(Into::into)
}

/// Read a nullable timestamp cell.
fn maybe_time(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<chrono::DateTime<chrono::Utc>>> {
    Ok(row.get::<_, Option<LegacyTime>>(idx)?.map(Into::into))
}

impl LegacyReader for SqliteReader {
    fn users(&self) -> Result<Vec<LegacyUser>> {
        self.select(table::USERS, schema::USER_COLUMNS, |row| {
            Ok(LegacyUser {
                id: row.get(0)?,
                account: text(row, 1)?,
                password_digest: text(row, 2)?,
                is_blocked: flag(row, 3)?,
                is_admin: flag(row, 4)?,
                created_at: time(row, 5)?,
                updated_at: time(row, 6)?,
                used_at: maybe_time(row, 7)?,
            })
        })
    }

    fn keys(&self) -> Result<Vec<LegacyKey>> {
        self.select(table::KEYS, schema::KEY_COLUMNS, |row| {
            Ok(LegacyKey {
                id: row.get(0)?,
                user_id: row.get(1)?,
                fingerprint: text(row, 2)?,
                is_sandbox: flag(row, 3)?,
                name: text(row, 4)?,
                created_at: time(row, 5)?,
                used_at: maybe_time(row, 6)?,
            })
        })
    }

    fn nodes(&self) -> Result<Vec<LegacyNode>> {
        self.select(table::SERVERS, schema::SERVER_COLUMNS, |row| {
            Ok(LegacyNode {
                id: row.get(0)?,
                name: text(row, 1)?,
                address: text(row, 2)?,
                is_auto: flag(row, 3)?,
                created_at: time(row, 4)?,
                used_at: maybe_time(row, 5)?,
            })
        })
    }

    fn grants(&self) -> Result<Vec<LegacyGrant>> {
        self.select(table::GRANTS, schema::GRANT_COLUMNS, |row| {
            Ok(LegacyGrant {
                id: row.get(0)?,
                user_id: row.get(1)?,
                server_name: text(row, 2)?,
                target_user: text(row, 3)?,
                created_at: time(row, 4)?,
                expires_at: maybe_time(row, 5)?,
            })
        })
    }

    fn sessions(&self) -> Result<Vec<LegacySession>> {
        self.select(table::SESSIONS, schema::SESSION_COLUMNS, |row| {
            Ok(LegacySession {
                id: row.get(0)?,
                user_account: text(row, 1)?,
                command: text(row, 2)?,
                created_at: time(row, 3)?,
                ended_at: maybe_time(row, 4)?,
                is_recorded: flag(row, 5)?,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_db(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("legacy.sqlite3");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, account TEXT, password_digest TEXT,
                 is_blocked INTEGER, is_admin INTEGER, created_at DATETIME, updated_at DATETIME,
                 used_at DATETIME, deleted_at DATETIME);
             CREATE TABLE keys (id INTEGER PRIMARY KEY, user_id INTEGER, fingerprint TEXT,
                 is_sandbox INTEGER, name TEXT, created_at DATETIME, used_at DATETIME);
             CREATE TABLE servers (id INTEGER PRIMARY KEY, name TEXT, address TEXT,
                 is_auto INTEGER, created_at DATETIME, used_at DATETIME);
             CREATE TABLE grants (id INTEGER PRIMARY KEY, user_id INTEGER, server_name TEXT,
                 target_user TEXT, created_at DATETIME, expires_at DATETIME);
             CREATE TABLE sessions (id INTEGER PRIMARY KEY, user_account TEXT, command TEXT,
                 created_at DATETIME, ended_at DATETIME, is_recorded INTEGER);

             INSERT INTO users VALUES (2, 'bob', 'digest-b', 1, 0,
                 '2018-01-01 00:00:00+00:00', '2018-01-02 00:00:00+00:00',
                 '2018-01-03 00:00:00+00:00', NULL);
             INSERT INTO users VALUES (1, 'alice', 'digest-a', 0, 1,
                 '2018-01-01 08:00:00+08:00', '2018-01-01 08:00:00+08:00', NULL, NULL);
             INSERT INTO users VALUES (3, 'carol', 'digest-c', 0, 0,
                 '2018-01-01 00:00:00+00:00', '2018-01-01 00:00:00+00:00', NULL,
                 '2018-02-01 00:00:00+00:00');
             INSERT INTO keys VALUES (1, 1, 'AA:BB', 0, 'laptop', 1514764800, NULL);
             INSERT INTO servers VALUES (1, 'web-1', '10.0.0.1:22', 1,
                 '2018-01-01T00:00:00Z', NULL);
             INSERT INTO grants VALUES (1, 1, 'web-*', 'deploy',
                 '2018-01-01 00:00:00', '2019-01-01 00:00:00');
             INSERT INTO sessions VALUES (6699, 'alice', 'ssh web-1',
                 '2018-01-01 00:00:00', NULL, 1);",
        )
        .unwrap();
        path
    }

    #[test]
    fn reads_users_ordered_and_skips_soft_deleted() {
        let dir = TempDir::new().unwrap();
        let reader = SqliteReader::open(create_test_db(&dir)).unwrap();

        let users = reader.users().unwrap();
        let accounts: Vec<_> = users.iter().map(|u| u.account.as_str()).collect();
        assert_eq!(accounts, ["alice", "bob"]);

        assert_eq!(users[0].created_at.timestamp(), 1_514_764_800);
        assert_eq!(users[0].is_admin, 1);
        assert!(users[0].used_at.is_none());
        assert!(users[1].used_at.is_some());
    }

    #[test]
    fn reads_dependent_tables() {
        let dir = TempDir::new().unwrap();
        let reader = SqliteReader::open(create_test_db(&dir)).unwrap();

        let keys = reader.keys().unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].fingerprint, "AA:BB");
        assert_eq!(keys[0].created_at.timestamp(), 1_514_764_800);

        let nodes = reader.nodes().unwrap();
        assert_eq!(nodes[0].name, "web-1");
        assert_eq!(nodes[0].is_auto, 1);

        let grants = reader.grants().unwrap();
        assert_eq!(grants[0].server_name, "web-*");
        assert!(grants[0].expires_at.is_some());

        let sessions = reader.sessions().unwrap();
        assert_eq!(sessions[0].id, 6699);
        assert!(sessions[0].ended_at.is_none());
    }

    #[test]
    fn malformed_timestamp_is_a_query_error() {
        let dir = TempDir::new().unwrap();
        let path = create_test_db(&dir);
        Connection::open(&path)
            .unwrap()
            .execute("UPDATE servers SET created_at = 'soon'", [])
            .unwrap();

        let reader = SqliteReader::open(&path).unwrap();
        let err = reader.nodes().unwrap_err();
        assert!(matches!(err, LegacyError::Query { table: "servers", .. }));
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = SqliteReader::open(dir.path().join("missing.sqlite3"));
        assert!(matches!(result, Err(LegacyError::Open { .. })));
    }
}
