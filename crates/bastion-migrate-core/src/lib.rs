//! Core types for the bastion migration tool.
//!
//! This crate provides the identifiers shared by the legacy reader, the new
//! document store and the migration engine:
//!
//! - **Natural keys**: [`Account`], the business identity of a user
//! - **Derived keys**: [`GrantId`], a content hash over a grant's fields
//! - **Copied keys**: [`SessionId`], the legacy numeric session id
//! - **Record kinds**: [`RecordKind`], the fixed set of migrated entities
//!
//! # Example
//!
//! ```
//! use bastion_migrate_core::{Account, GrantId, SessionId};
//!
//! let account = Account::new("alice").unwrap();
//! let id = GrantId::derive(&account, "web-*", "deploy");
//! assert_eq!(id, GrantId::derive(&account, "web-*", "deploy"));
//!
//! let session = SessionId::new(0x1a2b);
//! assert_eq!(session.to_hex(), "0000000000001a2b");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod kind;

pub use error::{IdError, Result};
pub use ids::{Account, GrantId, SessionId};
pub use kind::RecordKind;
