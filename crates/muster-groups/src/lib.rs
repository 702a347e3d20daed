//! # muster-groups
//!
//! Group domain for the Muster group-event coordination backend.
//!
//! This crate implements the group-side reaction protocols:
//!
//! - **Join Protocol**: join-code resolution with idempotent membership
//!   adds
//! - **Stats Provisioning**: seeding of per-group storage stats on group
//!   creation, merge-only against racing writers
//! - **Storage Quota Ledger**: eventually-exact per-group byte accounting
//!   driven by object finalize/delete signals, serialized per group and
//!   floored at zero
//!
//! All multi-step effects here are either a single atomic batch or a
//! conditional write retried on conflict; redelivered trigger events are
//! always safe.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod join;
pub mod ledger;
pub mod stats;

pub use error::{Error, Result};
pub use join::GroupDirectory;
pub use ledger::{LedgerUpdate, ObjectEvent, StorageLedger};
pub use stats::{StatsProvisioner, DEFAULT_STORAGE_QUOTA_BYTES};
