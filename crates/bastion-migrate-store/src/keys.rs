//! Key encoding utilities for `RocksDB`.
//!
//! Natural keys are stored as their UTF-8 bytes; session numbers big-endian
//! so that iteration follows numeric order for non-negative ids.

use bastion_migrate_core::{Account, GrantId, SessionId};

/// Encode a user key (the account bytes).
#[must_use]
pub fn user_key(account: &Account) -> Vec<u8> {
    account.as_str().as_bytes().to_vec()
}

/// Encode a key-record key (the fingerprint bytes).
#[must_use]
pub fn fingerprint_key(fingerprint: &str) -> Vec<u8> {
    fingerprint.as_bytes().to_vec()
}

/// Encode a node key (the hostname bytes).
#[must_use]
pub fn node_key(hostname: &str) -> Vec<u8> {
    hostname.as_bytes().to_vec()
}

/// Encode a grant key (the 32 id bytes).
#[must_use]
pub fn grant_key(id: &GrantId) -> Vec<u8> {
    id.as_bytes().to_vec()
}

/// Encode a session key: the 8-byte big-endian session number.
#[must_use]
pub fn session_key(id: SessionId) -> Vec<u8> {
    id.get().to_be_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_keys_sort_numerically() {
        let small = session_key(SessionId::new(0xff));
        let large = session_key(SessionId::new(0x100));
        assert!(small < large);
        assert_eq!(small.len(), 8);
    }

    #[test]
    fn grant_key_is_raw_id() {
        let id = GrantId::from_bytes([7u8; 32]);
        assert_eq!(grant_key(&id), vec![7u8; 32]);
    }
}
