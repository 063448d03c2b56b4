//! One-shot migration of a bunker deployment into bastion.
//!
//! The legacy deployment keeps its state in a normalized `SQLite` database
//! and its session recordings in a flat replay tree. This crate moves both
//! into the bastion layout: a `RocksDB` document store keyed by natural and
//! derived keys, and a replay tree sharded by session id.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ LegacyReader │──▶│  UserIndex   │──▶│  translate   │──▶│    Store     │
//! │   (SQLite)   │   │  (resolver)  │   │  (pure fns)  │   │  (RocksDB)   │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//!
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ legacy tree  │──▶│ ShardLayout  │──▶│  new tree    │
//! │  a/b/c/<id>  │   │  path_for    │   │ xx/yy/zz/<id>│
//! └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! The [`Migration`] driver runs the stages in dependency order and stops at
//! the first error. See the [`driver`] module for the stage machine.
//!
//! # Usage
//!
//! ```no_run
//! use bastion_migrate::{MigrateConfig, Migration};
//! use bastion_migrate_legacy::SqliteReader;
//! use bastion_migrate_store::RocksStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MigrateConfig::default();
//! config.validate()?;
//!
//! let reader = SqliteReader::open(&config.legacy_db)?;
//! let store = RocksStore::open(&config.store)?;
//!
//! let report = Migration::new(&reader, &store, &config).run()?;
//! println!("migrated {} sessions", report.sessions);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod archive;
pub mod config;
pub mod driver;
pub mod error;
pub mod report;
pub mod resolver;
pub mod translate;

pub use archive::{LegacyArchive, ShardLayout};
pub use config::MigrateConfig;
pub use driver::{Aborted, Migration, Stage};
pub use error::{IntegrityError, MigrateError, Result};
pub use report::MigrationReport;
pub use resolver::UserIndex;

// Re-export commonly used types from dependencies for convenience
pub use bastion_migrate_core::{Account, GrantId, RecordKind, SessionId};
