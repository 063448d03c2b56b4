//! Bastion migration tool.
//!
//! Reads a bunker database and replay tree and writes a bastion store and
//! replay tree. Every imported record is logged; the first failure stops the
//! run with a non-zero exit status.

use std::path::PathBuf;

use anyhow::Context;
use bastion_migrate::{Aborted, MigrateConfig, Migration, MigrationReport, ShardLayout};
use bastion_migrate_legacy::SqliteReader;
use bastion_migrate_store::{RocksStore, StoreError};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Migrate a bunker deployment into bastion.
#[derive(Parser, Debug)]
#[command(name = "bastion-migrate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input bunker SQLite database.
    #[arg(long, env = "BASTION_MIGRATE_DB_IN", default_value = "database.sqlite3")]
    db_in: PathBuf,

    /// Input bunker replays directory.
    #[arg(long, env = "BASTION_MIGRATE_REPLAYS_IN", default_value = "bunker-replays")]
    replays_in: PathBuf,

    /// Output bastion RocksDB directory.
    #[arg(long, env = "BASTION_MIGRATE_DB_OUT", default_value = "database.rocksdb")]
    db_out: PathBuf,

    /// Output bastion replays directory.
    #[arg(long, env = "BASTION_MIGRATE_REPLAYS_OUT", default_value = "bastion-replays")]
    replays_out: PathBuf,

    /// Directory levels above each file in the input replays directory.
    #[arg(long, env = "BASTION_MIGRATE_LEGACY_DEPTH", default_value_t = 3)]
    legacy_depth: usize,

    /// Directory levels above each file in the output replays directory.
    #[arg(long, env = "BASTION_MIGRATE_SHARD_DEPTH", default_value_t = 3)]
    shard_depth: usize,

    /// Hex digits per directory level in the output replays directory.
    #[arg(long, env = "BASTION_MIGRATE_SHARD_WIDTH", default_value_t = 2)]
    shard_width: usize,

    /// Write a JSON summary of the run to this file.
    #[arg(long, env = "BASTION_MIGRATE_REPORT")]
    report: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,
}

impl Args {
    fn into_config(self) -> (MigrateConfig, Option<PathBuf>) {
        let config = MigrateConfig {
            legacy_db: self.db_in,
            legacy_replays: self.replays_in,
            store: self.db_out,
            replays: self.replays_out,
            legacy_depth: self.legacy_depth,
            layout: ShardLayout {
                depth: self.shard_depth,
                width: self.shard_width,
            },
        };
        (config, self.report)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let default_filter = if args.debug {
        "debug"
    } else {
        "info,bastion_migrate=debug"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, report_path) = args.into_config();
    config.validate()?;

    tracing::info!(
        legacy_db = %config.legacy_db.display(),
        legacy_replays = %config.legacy_replays.display(),
        store = %config.store.display(),
        replays = %config.replays.display(),
        "starting migration"
    );

    let reader = SqliteReader::open(&config.legacy_db)?;
    let store = RocksStore::open(&config.store)
        .with_context(|| format!("failed to open store {}", config.store.display()))?;

    let result = Migration::new(&reader, &store, &config).run();
    let report = settle(result, store.flush())?;

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }

    Ok(())
}

/// Combine the run outcome with the final store flush.
///
/// An abort is reported in preference to a flush failure, which is only
/// logged in that case.
fn settle(
    result: Result<MigrationReport, Aborted>,
    flushed: Result<(), StoreError>,
) -> anyhow::Result<MigrationReport> {
    match (result, flushed) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(e)) => Err(e).context("failed to flush store"),
        (Err(aborted), flushed) => {
            if let Err(e) = flushed {
                tracing::error!(error = %e, "failed to flush store after abort");
            }
            Err(aborted.into())
        }
    }
}
