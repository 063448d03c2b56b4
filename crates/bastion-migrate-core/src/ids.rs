//! Identifier types for migrated records.
//!
//! Users, keys and nodes are identified by natural keys in the new schema;
//! grants by a hash over their content; sessions keep their legacy number.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IdError;

/// A user's account name, the primary key of a user record.
///
/// Accounts are never empty.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Account(String);

impl Account {
    /// Create an `Account` from a name.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` if the name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, IdError> {
        let name = name.into();
        if name.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(name))
    }

    /// Return the account name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self.0)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Account {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Account> for String {
    fn from(account: Account) -> Self {
        account.0
    }
}

impl AsRef<str> for Account {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A 32-byte grant identifier, derived via blake3.
///
/// The id is a pure function of the grant's account, hostname pattern and
/// target user, so importing the same logical grant twice yields the same key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GrantId([u8; 32]);

impl GrantId {
    /// Create a new `GrantId` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive the id of a grant from its resolved fields.
    ///
    /// Each field is length-prefixed before hashing, so shifting characters
    /// between adjacent fields changes the id.
    #[must_use]
    pub fn derive(account: &Account, hostname_pattern: &str, user: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        for field in [account.as_str(), hostname_pattern, user] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Parse a `GrantId` from a hex-encoded string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hex or not exactly 64 characters.
    pub fn from_hex(s: &str) -> Result<Self, IdError> {
        let bytes = hex::decode(s).map_err(|_| IdError::InvalidHex(s.to_string()))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|_| IdError::InvalidLength {
            expected: 64,
            got: s.len(),
        })?;
        Ok(Self(arr))
    }

    /// Return the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Return the hex-encoded string representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GrantId({})", self.to_hex())
    }
}

impl fmt::Display for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for GrantId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<GrantId> for String {
    fn from(id: GrantId) -> Self {
        id.to_hex()
    }
}

/// A session's numeric identifier, copied verbatim from the legacy store.
///
/// Replay archives are addressed by the hex rendering of this number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(i64);

impl SessionId {
    /// Number of hex digits in the canonical rendering.
    pub const HEX_DIGITS: usize = 16;

    /// Create a new `SessionId`.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Return the numeric value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Return the canonical 16-digit, zero-padded, lowercase hex rendering.
    ///
    /// Negative ids render as their two's complement bit pattern.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    /// Parse the canonical 16-digit rendering produced by [`SessionId::to_hex`].
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not exactly 16 hex digits.
    pub fn from_hex(s: &str) -> Result<Self, IdError> {
        if s.len() != Self::HEX_DIGITS {
            return Err(IdError::InvalidLength {
                expected: Self::HEX_DIGITS,
                got: s.len(),
            });
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdError::InvalidHex(s.to_string()));
        }
        let bits = u64::from_str_radix(s, 16).map_err(|_| IdError::InvalidHex(s.to_string()))?;
        Ok(Self(i64::from_be_bytes(bits.to_be_bytes())))
    }

    /// Parse a legacy replay file name: an unpadded, non-negative base-16 integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, contains anything but hex
    /// digits, or overflows a signed 64-bit integer.
    pub fn from_legacy_name(s: &str) -> Result<Self, IdError> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdError::InvalidHex(s.to_string()));
        }
        i64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| IdError::InvalidHex(s.to_string()))
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SessionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
