//! The migration driver.
//!
//! A run walks six stages in a fixed order. Each stage reads every legacy
//! record of one kind, resolves and translates it, and upserts it into the
//! new store before moving to the next record. The last stage relocates the
//! replay archives.
//!
//! ```text
//!  Users ──▶ Keys ──▶ Nodes ──▶ Grants ──▶ Sessions ──▶ Archives ──▶ Completed
//!    │         │        │          │           │            │
//!    └─────────┴────────┴──────────┴───────────┴────────────┴──────▶ Aborted
//! ```
//!
//! The first error of any kind moves the run to `Aborted`. Records written
//! before the failure stay in the new store.

use std::fmt;

use bastion_migrate_core::RecordKind;
use bastion_migrate_legacy::LegacyReader;
use bastion_migrate_store::Store;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::archive::{copy_archive, discover_legacy_archives};
use crate::config::MigrateConfig;
use crate::error::{MigrateError, Result};
use crate::report::MigrationReport;
use crate::resolver::UserIndex;
use crate::translate;

/// A step of the migration, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Import users and build the user index.
    Users,
    /// Import keys, resolving their owners.
    Keys,
    /// Import nodes.
    Nodes,
    /// Import grants, resolving their owners and deriving their ids.
    Grants,
    /// Import sessions.
    Sessions,
    /// Copy replay archives into the sharded tree.
    Archives,
}

impl Stage {
    /// All stages, in execution order.
    pub const ALL: [Self; 6] = [
        Self::Users,
        Self::Keys,
        Self::Nodes,
        Self::Grants,
        Self::Sessions,
        Self::Archives,
    ];

    /// Lowercase name, used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Keys => "keys",
            Self::Nodes => "nodes",
            Self::Grants => "grants",
            Self::Sessions => "sessions",
            Self::Archives => "archives",
        }
    }

    /// The record kind imported by this stage, if it imports records.
    #[must_use]
    pub const fn record_kind(self) -> Option<RecordKind> {
        match self {
            Self::Users => Some(RecordKind::User),
            Self::Keys => Some(RecordKind::Key),
            Self::Nodes => Some(RecordKind::Node),
            Self::Grants => Some(RecordKind::Grant),
            Self::Sessions => Some(RecordKind::Session),
            Self::Archives => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a migration run.
#[derive(Debug, Error)]
#[error("migration aborted during {stage} stage: {error}")]
pub struct Aborted {
    /// Stage that failed.
    pub stage: Stage,
    /// What had been written before the failure.
    pub report: MigrationReport,
    /// The causing error.
    #[source]
    pub error: MigrateError,
}

/// A single migration run over a legacy reader and a new store.
pub struct Migration<'a, R: ?Sized, S: ?Sized> {
    reader: &'a R,
    store: &'a S,
    config: &'a MigrateConfig,
}

impl<'a, R, S> Migration<'a, R, S>
where
    R: LegacyReader + ?Sized,
    S: Store + ?Sized,
{
    /// Create a run. Nothing is read or written until [`Migration::run`].
    #[must_use]
    pub const fn new(reader: &'a R, store: &'a S, config: &'a MigrateConfig) -> Self {
        Self {
            reader,
            store,
            config,
        }
    }

    /// Execute every stage in order.
    ///
    /// # Errors
    ///
    /// Returns `Aborted` at the first failure, carrying the failing stage and
    /// what had been written up to that point. An invalid configuration
    /// aborts the users stage before anything is written.
    pub fn run(&self) -> std::result::Result<MigrationReport, Aborted> {
        let mut report = MigrationReport::default();

        let index = self.stage(Stage::Users, &mut report, |r| {
            self.config.validate()?;
            self.import_users(r)
        })?;
        self.stage(Stage::Keys, &mut report, |r| self.import_keys(&index, r))?;
        self.stage(Stage::Nodes, &mut report, |r| self.import_nodes(r))?;
        self.stage(Stage::Grants, &mut report, |r| self.import_grants(&index, r))?;
        self.stage(Stage::Sessions, &mut report, |r| self.import_sessions(r))?;
        self.stage(Stage::Archives, &mut report, |r| self.copy_archives(r))?;

        info!(
            users = report.users,
            keys = report.keys,
            nodes = report.nodes,
            grants = report.grants,
            sessions = report.sessions,
            archives = report.archives,
            archive_bytes = report.archive_bytes,
            "migration completed"
        );
        Ok(report)
    }

    fn stage<T>(
        &self,
        stage: Stage,
        report: &mut MigrationReport,
        run: impl FnOnce(&mut MigrationReport) -> Result<T>,
    ) -> std::result::Result<T, Aborted> {
        debug!(%stage, "stage started");
        match run(report) {
            Ok(value) => {
                let count = stage
                    .record_kind()
                    .map_or(report.archives, |kind| report.count(kind));
                info!(%stage, count, "stage completed");
                Ok(value)
            }
            Err(error) => {
                error!(%stage, %error, "migration aborted");
                Err(Aborted {
                    stage,
                    report: report.clone(),
                    error,
                })
            }
        }
    }

    fn import_users(&self, report: &mut MigrationReport) -> Result<UserIndex> {
        let users = self.reader.users()?;
        let index = UserIndex::build(&users)?;
        debug!(users = index.len(), "built user index");

        for legacy in &users {
            let user = translate::translate_user(legacy)?;
            self.store.put_user(&user).inspect_err(|e| {
                error!(account = %user.account, error = %e, "failed to import user");
            })?;
            report.record(RecordKind::User);
            info!(
                account = %user.account,
                admin = user.is_admin,
                blocked = user.is_blocked,
                viewed_at = user.viewed_at,
                "user imported"
            );
        }

        Ok(index)
    }

    fn import_keys(&self, index: &UserIndex, report: &mut MigrationReport) -> Result<()> {
        for legacy in &self.reader.keys()? {
            let account = index.resolve(RecordKind::Key, legacy.id, legacy.user_id)?;
            let key = translate::translate_key(legacy, account.clone())?;
            self.store.put_key(&key).inspect_err(|e| {
                error!(fingerprint = %key.fingerprint, error = %e, "failed to import key");
            })?;
            report.record(RecordKind::Key);
            info!(
                fingerprint = %key.fingerprint,
                account = %key.account,
                source = %key.source,
                "key imported"
            );
        }
        Ok(())
    }

    fn import_nodes(&self, report: &mut MigrationReport) -> Result<()> {
        for legacy in &self.reader.nodes()? {
            let node = translate::translate_node(legacy)?;
            self.store.put_node(&node).inspect_err(|e| {
                error!(hostname = %node.hostname, error = %e, "failed to import node");
            })?;
            report.record(RecordKind::Node);
            info!(
                hostname = %node.hostname,
                address = %node.address,
                source = %node.source,
                "node imported"
            );
        }
        Ok(())
    }

    fn import_grants(&self, index: &UserIndex, report: &mut MigrationReport) -> Result<()> {
        for legacy in &self.reader.grants()? {
            let account = index.resolve(RecordKind::Grant, legacy.id, legacy.user_id)?;
            let grant = translate::translate_grant(legacy, account.clone())?;
            self.store.put_grant(&grant).inspect_err(|e| {
                error!(
                    grant_id = %grant.id,
                    legacy_id = legacy.id,
                    error = %e,
                    "failed to import grant"
                );
            })?;
            report.record(RecordKind::Grant);
            info!(
                grant_id = %grant.id,
                account = %grant.account,
                hostname_pattern = %grant.hostname_pattern,
                user = %grant.user,
                expired_at = grant.expired_at,
                "grant imported"
            );
        }
        Ok(())
    }

    fn import_sessions(&self, report: &mut MigrationReport) -> Result<()> {
        for legacy in &self.reader.sessions()? {
            let session = translate::translate_session(legacy);
            self.store.put_session(&session).inspect_err(|e| {
                error!(session_id = %session.id, error = %e, "failed to import session");
            })?;
            report.record(RecordKind::Session);
            info!(
                session_id = %session.id,
                account = %session.account,
                recorded = session.is_recorded,
                "session imported"
            );
        }
        Ok(())
    }

    fn copy_archives(&self, report: &mut MigrationReport) -> Result<()> {
        let archives =
            discover_legacy_archives(&self.config.legacy_replays, self.config.legacy_depth)?;
        debug!(count = archives.len(), "discovered legacy archives");

        for archive in &archives {
            let dest = self
                .config
                .layout
                .path_for(&self.config.replays, archive.session_id);
            let bytes = copy_archive(&archive.path, &dest).inspect_err(|e| {
                error!(
                    session_id = %archive.session_id,
                    from = %archive.path.display(),
                    to = %dest.display(),
                    error = %e,
                    "failed to copy archive"
                );
            })?;
            report.archive(bytes);
            info!(
                session_id = %archive.session_id,
                from = %archive.path.display(),
                to = %dest.display(),
                bytes,
                "archive copied"
            );
        }
        Ok(())
    }
}
