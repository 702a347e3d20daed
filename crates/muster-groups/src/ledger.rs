//! Storage quota ledger: per-group byte accounting for uploads.
//!
//! Driven by object finalize/delete signals from the blob store. Each
//! update is a serializable read-modify-write on the group's stats
//! record: the current counter is read and the new value written under a
//! version precondition, retried on conflict, so concurrent events for
//! the same group never lose an update. The counter floors at zero —
//! duplicate or out-of-order delete signals cannot drive it negative.

use serde_json::{json, Map};
use std::sync::Arc;

use muster_core::records::fields;
use muster_core::{
    DocPath, DocumentStore, GroupId, UploadPath, WritePrecondition, WriteResult,
};

use crate::error::{Error, Result};

/// Counter: ledger updates applied, labeled by operation.
pub const LEDGER_UPDATES: &str = "storage_ledger_updates_total";

const MAX_TX_ATTEMPTS: usize = 8;

/// An object finalize/delete signal from the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEvent {
    /// Full object path within the bucket.
    pub object_path: String,
    /// Object size in bytes.
    pub size_bytes: u64,
}

/// Result of feeding one object event to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerUpdate {
    /// The event did not concern a group upload and was ignored.
    Ignored,
    /// The counter was updated.
    Applied {
        /// The group's usage after the update.
        storage_used_bytes: u64,
    },
}

#[derive(Debug, Clone, Copy)]
enum Adjustment {
    Add(u64),
    Subtract(u64),
}

impl Adjustment {
    fn apply(self, current: u64) -> u64 {
        match self {
            Self::Add(size) => current.saturating_add(size),
            Self::Subtract(size) => current.saturating_sub(size),
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Add(_) => "finalize",
            Self::Subtract(_) => "delete",
        }
    }
}

/// Maintains each group's `storageUsedBytes` counter.
#[derive(Clone)]
pub struct StorageLedger {
    store: Arc<dyn DocumentStore>,
}

impl StorageLedger {
    /// Creates a ledger over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Reacts to an object-finalize signal by adding its size.
    pub async fn record_finalized(&self, event: &ObjectEvent) -> Result<LedgerUpdate> {
        self.adjust(event, Adjustment::Add(event.size_bytes)).await
    }

    /// Reacts to an object-delete signal by subtracting its size,
    /// flooring the counter at zero.
    pub async fn record_deleted(&self, event: &ObjectEvent) -> Result<LedgerUpdate> {
        self.adjust(event, Adjustment::Subtract(event.size_bytes))
            .await
    }

    #[tracing::instrument(
        skip(self, event),
        fields(path = %event.object_path, size = event.size_bytes, op = adjustment.label())
    )]
    async fn adjust(&self, event: &ObjectEvent, adjustment: Adjustment) -> Result<LedgerUpdate> {
        if event.size_bytes == 0 {
            return Ok(LedgerUpdate::Ignored);
        }
        let Some(upload) = UploadPath::parse(&event.object_path) else {
            return Ok(LedgerUpdate::Ignored);
        };

        let new_used = self
            .read_modify_write(upload.group_id(), adjustment)
            .await?;
        metrics::counter!(LEDGER_UPDATES, "op" => adjustment.label()).increment(1);
        tracing::debug!(group = %upload.group_id(), new_used, "storage counter updated");
        Ok(LedgerUpdate::Applied {
            storage_used_bytes: new_used,
        })
    }

    /// One serializable counter update, retried on version conflicts.
    ///
    /// A missing stats record reads as zero and is created by the same
    /// conditional write; fields other than the counter (in particular
    /// `storageQuotaBytes`) are carried over untouched.
    async fn read_modify_write(&self, group: &GroupId, adjustment: Adjustment) -> Result<u64> {
        let path = DocPath::group_storage_stats(group);

        for _ in 0..MAX_TX_ATTEMPTS {
            let snapshot = self.store.get(&path).await?;
            let (mut merged, current, precondition) = match snapshot {
                Some(doc) => {
                    let current = doc.u64_field(fields::STORAGE_USED_BYTES).unwrap_or(0);
                    (
                        doc.fields,
                        current,
                        WritePrecondition::MatchesVersion(doc.version),
                    )
                }
                None => (Map::new(), 0, WritePrecondition::DoesNotExist),
            };

            let new_used = adjustment.apply(current);
            merged.insert(fields::STORAGE_USED_BYTES.to_string(), json!(new_used));

            match self.store.put(&path, merged, precondition).await? {
                WriteResult::Success { .. } => return Ok(new_used),
                WriteResult::PreconditionFailed { .. } => {}
            }
        }

        Err(Error::CounterContention {
            group: group.clone(),
            attempts: MAX_TX_ATTEMPTS,
        })
    }
}
