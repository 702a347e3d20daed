//! # muster-core
//!
//! Core abstractions for the Muster group-event coordination backend.
//!
//! This crate provides the foundational types and traits used across all
//! Muster components:
//!
//! - **Identifiers**: Validated newtypes for users, groups, tokens, and
//!   join codes
//! - **Document Store**: The contract required of the external
//!   transactional store (CAS writes, atomic batches, bounded queries),
//!   with an in-memory backend for tests
//! - **Record Contracts**: Typed views of the persisted document layout
//! - **Upload Paths**: The parser for group upload object paths
//! - **Error Types**: Shared error taxonomy and result alias
//!
//! ## Crate Boundary
//!
//! `muster-core` is the **only** crate allowed to define shared
//! primitives. The notification and group domains depend on this crate
//! and never on each other.
//!
//! ## Example
//!
//! ```rust
//! use muster_core::prelude::*;
//!
//! let user = UserId::new("u-1").unwrap();
//! let path = DocPath::user(&user);
//! assert_eq!(path.as_str(), "users/u-1");
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod batch;
pub mod document;
pub mod error;
pub mod id;
pub mod observability;
pub mod records;
pub mod store;
pub mod upload_path;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use muster_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::batch::{bounded_batches, BatchLimit};
    pub use crate::document::{collections, DocPath, Document};
    pub use crate::error::{Error, Result};
    pub use crate::id::{DeviceToken, GroupId, JoinCode, UserId};
    pub use crate::records::{
        AppConfigRecord, ChatMessageRecord, GroupRecord, Role, StorageStatsRecord, UserRecord,
    };
    pub use crate::store::{DocumentStore, Filter, MemoryStore, WriteOp, WritePrecondition, WriteResult};
    pub use crate::upload_path::UploadPath;
}

// Re-export key types at crate root for ergonomics
pub use batch::{bounded_batches, BatchLimit};
pub use document::{DocPath, Document};
pub use error::{Error, Result};
pub use id::{DeviceToken, GroupId, JoinCode, UserId};
pub use observability::{init_logging, LogFormat};
pub use records::{
    AppConfigRecord, ChatMessageRecord, GroupRecord, Role, StorageStatsRecord, UserRecord,
};
pub use store::{DocumentStore, Filter, MemoryStore, WriteOp, WritePrecondition, WriteResult};
pub use upload_path::UploadPath;
