//! Migration configuration.
//!
//! This module defines the four locations a migration works on and the
//! shape of the legacy and new replay trees.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::archive::ShardLayout;
use crate::error::{MigrateError, Result};

/// Configuration for a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateConfig {
    /// Legacy `SQLite` database.
    #[serde(default = "MigrateConfig::default_legacy_db")]
    pub legacy_db: PathBuf,

    /// Root of the legacy replay tree.
    #[serde(default = "MigrateConfig::default_legacy_replays")]
    pub legacy_replays: PathBuf,

    /// Destination `RocksDB` directory.
    #[serde(default = "MigrateConfig::default_store")]
    pub store: PathBuf,

    /// Root of the new replay tree.
    #[serde(default = "MigrateConfig::default_replays")]
    pub replays: PathBuf,

    /// Directory levels between the legacy replay root and each file.
    #[serde(default = "MigrateConfig::default_legacy_depth")]
    pub legacy_depth: usize,

    /// Layout of the new replay tree.
    #[serde(default)]
    pub layout: ShardLayout,
}

impl MigrateConfig {
    fn default_legacy_db() -> PathBuf {
        PathBuf::from("database.sqlite3")
    }

    fn default_legacy_replays() -> PathBuf {
        PathBuf::from("bunker-replays")
    }

    fn default_store() -> PathBuf {
        PathBuf::from("database.rocksdb")
    }

    fn default_replays() -> PathBuf {
        PathBuf::from("bastion-replays")
    }

    const fn default_legacy_depth() -> usize {
        3
    }

    /// Check the configuration before anything is opened.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::Config` if the shard layout is invalid or the
    /// new replay tree would overlap the legacy one.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        if self.replays.starts_with(&self.legacy_replays)
            || self.legacy_replays.starts_with(&self.replays)
        {
            return Err(MigrateError::Config(format!(
                "replay trees overlap: {} and {}",
                self.legacy_replays.display(),
                self.replays.display()
            )));
        }
        Ok(())
    }
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            legacy_db: Self::default_legacy_db(),
            legacy_replays: Self::default_legacy_replays(),
            store: Self::default_store(),
            replays: Self::default_replays(),
            legacy_depth: Self::default_legacy_depth(),
            layout: ShardLayout::default(),
        }
    }
}
