//! Group storage stats provisioning.
//!
//! When a group is created, its `stats/storage` sub-document is seeded
//! with a zeroed usage counter and the process-wide default quota. The
//! seed must not clobber a record that already exists — an upload event
//! can race group creation and write the counter first — so provisioning
//! only ever fills fields that are missing.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map};
use std::sync::Arc;

use muster_core::records::fields;
use muster_core::{
    AppConfigRecord, DocPath, DocumentStore, Error as CoreError, GroupId, WritePrecondition,
    WriteResult,
};

use crate::error::Result;

/// Fallback storage quota when `app/config` has no default: 2 GiB.
pub const DEFAULT_STORAGE_QUOTA_BYTES: u64 = 2_147_483_648;

const MAX_PROVISION_ATTEMPTS: usize = 5;

/// Seeds `stats/storage` records for newly created groups.
#[derive(Clone)]
pub struct StatsProvisioner {
    store: Arc<dyn DocumentStore>,
}

impl StatsProvisioner {
    /// Creates a provisioner over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Reacts to the creation of `group`.
    ///
    /// Reads the default quota once, non-transactionally, then merges
    /// `{storageUsedBytes: 0, storageQuotaBytes: default}` into the stats
    /// record without overwriting any field that already exists.
    /// Redelivery is safe: a fully provisioned record is left untouched.
    #[tracing::instrument(skip(self), fields(group = %group))]
    pub async fn on_group_created(&self, group: &GroupId) -> Result<()> {
        let default_quota = self.default_quota().await;
        let path = DocPath::group_storage_stats(group);

        for _ in 0..MAX_PROVISION_ATTEMPTS {
            match self.store.get(&path).await? {
                None => {
                    let mut seed = Map::new();
                    seed.insert(fields::STORAGE_USED_BYTES.to_string(), json!(0));
                    seed.insert(fields::STORAGE_QUOTA_BYTES.to_string(), json!(default_quota));
                    seed.insert(
                        fields::CREATED_AT.to_string(),
                        json!(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
                    );
                    match self
                        .store
                        .put(&path, seed, WritePrecondition::DoesNotExist)
                        .await?
                    {
                        WriteResult::Success { .. } => return Ok(()),
                        // Lost the race with an upload event; fill around it.
                        WriteResult::PreconditionFailed { .. } => continue,
                    }
                }
                Some(doc) => {
                    let mut merged = doc.fields.clone();
                    let mut missing = false;
                    if !merged.contains_key(fields::STORAGE_USED_BYTES) {
                        merged.insert(fields::STORAGE_USED_BYTES.to_string(), json!(0));
                        missing = true;
                    }
                    if !merged.contains_key(fields::STORAGE_QUOTA_BYTES) {
                        merged
                            .insert(fields::STORAGE_QUOTA_BYTES.to_string(), json!(default_quota));
                        missing = true;
                    }
                    if !missing {
                        return Ok(());
                    }
                    match self
                        .store
                        .put(&path, merged, WritePrecondition::MatchesVersion(doc.version))
                        .await?
                    {
                        WriteResult::Success { .. } => return Ok(()),
                        WriteResult::PreconditionFailed { .. } => continue,
                    }
                }
            }
        }

        Err(CoreError::transient(format!(
            "stats provisioning for group {group} kept losing its write"
        ))
        .into())
    }

    /// Reads the process-wide default quota.
    ///
    /// An unreadable or absent config document falls back to
    /// [`DEFAULT_STORAGE_QUOTA_BYTES`]; provisioning must not fail because
    /// config is missing.
    async fn default_quota(&self) -> u64 {
        match self.store.get(&DocPath::app_config()).await {
            Ok(Some(doc)) => doc
                .decode::<AppConfigRecord>()
                .ok()
                .and_then(|config| config.storage_bytes_quota_default)
                .unwrap_or(DEFAULT_STORAGE_QUOTA_BYTES),
            Ok(None) => DEFAULT_STORAGE_QUOTA_BYTES,
            Err(error) => {
                tracing::warn!(%error, "config read failed, using fallback quota");
                DEFAULT_STORAGE_QUOTA_BYTES
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_core::{MemoryStore, WriteOp};
    use serde_json::Value;

    fn group(raw: &str) -> GroupId {
        GroupId::new(raw).unwrap()
    }

    async fn seed(store: &MemoryStore, path: DocPath, doc: Value) {
        let Value::Object(fields) = doc else {
            panic!("seed must be an object");
        };
        store
            .commit(vec![WriteOp::Merge { path, fields }])
            .await
            .unwrap();
    }

    fn provisioner(store: &Arc<MemoryStore>) -> StatsProvisioner {
        StatsProvisioner::new(Arc::clone(store) as Arc<dyn DocumentStore>)
    }

    #[tokio::test]
    async fn seeds_with_the_fallback_quota() {
        let store = Arc::new(MemoryStore::new());
        provisioner(&store)
            .on_group_created(&group("g1"))
            .await
            .unwrap();

        let doc = store
            .get(&DocPath::group_storage_stats(&group("g1")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.u64_field(fields::STORAGE_USED_BYTES), Some(0));
        assert_eq!(
            doc.u64_field(fields::STORAGE_QUOTA_BYTES),
            Some(DEFAULT_STORAGE_QUOTA_BYTES)
        );
        assert!(doc.str_field(fields::CREATED_AT).is_some());
    }

    #[tokio::test]
    async fn seeds_with_the_configured_default() {
        let store = Arc::new(MemoryStore::new());
        seed(
            &store,
            DocPath::app_config(),
            json!({"storageBytesQuotaDefault": 1_000_000}),
        )
        .await;

        provisioner(&store)
            .on_group_created(&group("g1"))
            .await
            .unwrap();

        let doc = store
            .get(&DocPath::group_storage_stats(&group("g1")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.u64_field(fields::STORAGE_QUOTA_BYTES), Some(1_000_000));
    }

    #[tokio::test]
    async fn never_overwrites_an_existing_counter() {
        let store = Arc::new(MemoryStore::new());
        // An upload event got there first.
        seed(
            &store,
            DocPath::group_storage_stats(&group("g1")),
            json!({"storageUsedBytes": 500}),
        )
        .await;

        provisioner(&store)
            .on_group_created(&group("g1"))
            .await
            .unwrap();

        let doc = store
            .get(&DocPath::group_storage_stats(&group("g1")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.u64_field(fields::STORAGE_USED_BYTES), Some(500));
        assert_eq!(
            doc.u64_field(fields::STORAGE_QUOTA_BYTES),
            Some(DEFAULT_STORAGE_QUOTA_BYTES)
        );
    }

    #[tokio::test]
    async fn redelivery_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        let provisioner = provisioner(&store);
        provisioner.on_group_created(&group("g1")).await.unwrap();

        let before = store
            .get(&DocPath::group_storage_stats(&group("g1")))
            .await
            .unwrap()
            .unwrap();
        provisioner.on_group_created(&group("g1")).await.unwrap();
        let after = store
            .get(&DocPath::group_storage_stats(&group("g1")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.version, after.version);
    }
}
