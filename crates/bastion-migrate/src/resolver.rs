//! Resolution of legacy numeric user references to accounts.
//!
//! The index is built once from the full set of legacy users and is never
//! mutated afterwards; dependent stages borrow it.

use std::collections::HashMap;

use bastion_migrate_core::{Account, RecordKind};
use bastion_migrate_legacy::LegacyUser;

use crate::error::IntegrityError;

/// Immutable map from legacy user id to account.
#[derive(Debug, Clone, Default)]
pub struct UserIndex {
    accounts: HashMap<i64, Account>,
}

impl UserIndex {
    /// Build the index from every legacy user.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::MissingField` if a user has an empty account.
    pub fn build(users: &[LegacyUser]) -> Result<Self, IntegrityError> {
        let accounts = users
            .iter()
            .map(|user| {
                Account::new(user.account.as_str())
                    .map(|account| (user.id, account))
                    .map_err(|_| IntegrityError::MissingField {
                        kind: RecordKind::User,
                        legacy_id: user.id,
                        field: "account",
                    })
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self { accounts })
    }

    /// Resolve the account of `user_id`, referenced by the `kind` record `legacy_id`.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::MissingUser` if no legacy user has that id.
    pub fn resolve(
        &self,
        kind: RecordKind,
        legacy_id: i64,
        user_id: i64,
    ) -> Result<&Account, IntegrityError> {
        self.accounts
            .get(&user_id)
            .ok_or(IntegrityError::MissingUser {
                kind,
                legacy_id,
                user_id,
            })
    }

    /// Number of indexed users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if no users are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
