//! Translation of legacy records into the new schema.
//!
//! Every function here is pure. References to users arrive already resolved;
//! the only failures are empty values that would become part of a key.

use bastion_migrate_core::{Account, GrantId, RecordKind, SessionId};
use bastion_migrate_legacy::{LegacyGrant, LegacyKey, LegacyNode, LegacySession, LegacyUser};
use bastion_migrate_store::{Grant, Key, KeySource, Node, NodeSource, Session, User};
use chrono::{DateTime, Utc};

use crate::error::IntegrityError;

/// Convert a legacy timestamp to epoch seconds.
#[must_use]
pub fn epoch(time: DateTime<Utc>) -> i64 {
    time.timestamp()
}

/// Convert an optional legacy timestamp to epoch seconds, zero if absent.
#[must_use]
pub fn epoch_or_zero(time: Option<DateTime<Utc>>) -> i64 {
    time.map_or(0, epoch)
}

/// Convert a legacy integer flag.
#[must_use]
pub const fn flag(value: i64) -> bool {
    value != 0
}

/// Map the legacy sandbox flag to a key source.
#[must_use]
pub const fn key_source(is_sandbox: i64) -> KeySource {
    if flag(is_sandbox) {
        KeySource::Sandbox
    } else {
        KeySource::Manual
    }
}

/// Map the legacy auto-discovery flag to a node source.
#[must_use]
pub const fn node_source(is_auto: i64) -> NodeSource {
    if flag(is_auto) {
        NodeSource::Discovered
    } else {
        NodeSource::Manual
    }
}

fn require(
    kind: RecordKind,
    legacy_id: i64,
    field: &'static str,
    value: &str,
) -> Result<(), IntegrityError> {
    if value.is_empty() {
        return Err(IntegrityError::MissingField {
            kind,
            legacy_id,
            field,
        });
    }
    Ok(())
}

/// Translate a legacy user. The nickname defaults to the account.
///
/// # Errors
///
/// Returns `IntegrityError::MissingField` if the account is empty.
pub fn translate_user(legacy: &LegacyUser) -> Result<User, IntegrityError> {
    let account =
        Account::new(legacy.account.as_str()).map_err(|_| IntegrityError::MissingField {
            kind: RecordKind::User,
            legacy_id: legacy.id,
            field: "account",
        })?;

    Ok(User {
        nickname: account.to_string(),
        account,
        password_digest: legacy.password_digest.clone(),
        is_blocked: flag(legacy.is_blocked),
        is_admin: flag(legacy.is_admin),
        created_at: epoch(legacy.created_at),
        updated_at: epoch(legacy.updated_at),
        viewed_at: epoch_or_zero(legacy.used_at),
    })
}

/// Translate a legacy key owned by `account`.
///
/// # Errors
///
/// Returns `IntegrityError::MissingField` if the fingerprint is empty.
pub fn translate_key(legacy: &LegacyKey, account: Account) -> Result<Key, IntegrityError> {
    require(RecordKind::Key, legacy.id, "fingerprint", &legacy.fingerprint)?;

    Ok(Key {
        fingerprint: legacy.fingerprint.clone(),
        account,
        source: key_source(legacy.is_sandbox),
        name: legacy.name.clone(),
        created_at: epoch(legacy.created_at),
        viewed_at: epoch_or_zero(legacy.used_at),
    })
}

/// Translate a legacy server. Every node logs in as [`Node::DEFAULT_USER`].
///
/// # Errors
///
/// Returns `IntegrityError::MissingField` if the server name is empty.
pub fn translate_node(legacy: &LegacyNode) -> Result<Node, IntegrityError> {
    require(RecordKind::Node, legacy.id, "name", &legacy.name)?;

    Ok(Node {
        hostname: legacy.name.clone(),
        address: legacy.address.clone(),
        user: Node::DEFAULT_USER.to_string(),
        source: node_source(legacy.is_auto),
        created_at: epoch(legacy.created_at),
        viewed_at: epoch_or_zero(legacy.used_at),
    })
}

/// Translate a legacy grant owned by `account`, deriving its new id.
///
/// # Errors
///
/// Returns `IntegrityError::MissingField` if the server pattern or target
/// user is empty, since both feed the derived id.
pub fn translate_grant(legacy: &LegacyGrant, account: Account) -> Result<Grant, IntegrityError> {
    require(RecordKind::Grant, legacy.id, "server_name", &legacy.server_name)?;
    require(RecordKind::Grant, legacy.id, "target_user", &legacy.target_user)?;

    Ok(Grant {
        id: GrantId::derive(&account, &legacy.server_name, &legacy.target_user),
        account,
        hostname_pattern: legacy.server_name.clone(),
        user: legacy.target_user.clone(),
        created_at: epoch(legacy.created_at),
        expired_at: epoch_or_zero(legacy.expires_at),
    })
}

/// Translate a legacy session. The account is copied without resolution.
#[must_use]
pub fn translate_session(legacy: &LegacySession) -> Session {
    Session {
        id: SessionId::new(legacy.id),
        account: legacy.user_account.clone(),
        command: legacy.command.clone(),
        created_at: epoch(legacy.created_at),
        finished_at: epoch_or_zero(legacy.ended_at),
        is_recorded: flag(legacy.is_recorded),
    }
}
