//! Document store abstraction for the external transactional store.
//!
//! This module defines the contract this subsystem requires of its backing
//! store:
//!
//! - Conditional single-document writes (CAS) via version preconditions —
//!   the primitive behind every serializable read-modify-write
//! - Multi-document atomic batches — a batch fully applies or not at all
//! - Equality, array-contains, array-contains-any, and bounded id-in queries
//!
//! The version token is an opaque `String`; backends interpret it according
//! to their own semantics. Precondition failure is a normal result, never
//! an error.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::document::{DocPath, Document};
use crate::error::{Error, Result};

/// Precondition for conditional writes (CAS operations).
#[derive(Debug, Clone)]
pub enum WritePrecondition {
    /// Write only if the document does not exist.
    DoesNotExist,
    /// Write only if the document's version matches the given token.
    MatchesVersion(String),
    /// Write unconditionally.
    None,
}

/// Result of a conditional write.
#[derive(Debug, Clone)]
pub enum WriteResult {
    /// Write succeeded, returns the new version token.
    Success {
        /// The new version token after the write.
        version: String,
    },
    /// Precondition failed, returns the current version token.
    PreconditionFailed {
        /// The current version that caused the precondition to fail.
        current_version: String,
    },
}

/// A single mutation inside an atomic batch.
///
/// Semantics (matching the external store's merge/array primitives):
///
/// - `Merge` upserts the document and overwrites exactly the listed fields.
/// - `ArrayUnion` upserts the document and appends values not already
///   present in the array field (a non-array field is replaced).
/// - `ArrayRemove` removes all equal values from the array field; a missing
///   document or non-array field is a no-op.
/// - `DeleteField` removes the field; a missing document is a no-op.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Upsert a document, overwriting only the listed fields.
    Merge {
        /// Target document.
        path: DocPath,
        /// Fields to write.
        fields: Map<String, Value>,
    },
    /// Add values to an array field, skipping values already present.
    ArrayUnion {
        /// Target document.
        path: DocPath,
        /// Array field name.
        field: String,
        /// Values to add.
        values: Vec<Value>,
    },
    /// Remove all equal values from an array field.
    ArrayRemove {
        /// Target document.
        path: DocPath,
        /// Array field name.
        field: String,
        /// Values to remove.
        values: Vec<Value>,
    },
    /// Delete a field from a document.
    DeleteField {
        /// Target document.
        path: DocPath,
        /// Field to delete.
        field: String,
    },
}

/// A filter over the direct documents of a collection.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Field equals value.
    FieldEq {
        /// Field name.
        field: String,
        /// Value to compare against.
        value: Value,
    },
    /// Array field contains value.
    ArrayContains {
        /// Array field name.
        field: String,
        /// Value to look for.
        value: Value,
    },
    /// Array field contains any of the values. Bounded by the store's
    /// in-query limit; callers chunk via [`crate::batch::bounded_batches`].
    ArrayContainsAny {
        /// Array field name.
        field: String,
        /// Values to look for.
        values: Vec<Value>,
    },
    /// Document id is one of the listed ids. Bounded by the store's
    /// in-query limit; callers chunk via [`crate::batch::bounded_batches`].
    IdIn {
        /// Document ids to match.
        ids: Vec<String>,
    },
}

/// The contract this subsystem requires of the external document store.
///
/// All multi-document effects go through [`DocumentStore::commit`]; there
/// is no partial application. Single-document serializable transactions
/// are built from [`DocumentStore::get`] + [`DocumentStore::put`] with a
/// version precondition, retried on conflict.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Reads a document snapshot.
    ///
    /// Returns `None` when the document does not exist.
    async fn get(&self, path: &DocPath) -> Result<Option<Document>>;

    /// Writes the full document with an optional precondition.
    ///
    /// Returns `WriteResult::PreconditionFailed` when the precondition is
    /// not met; that is a normal result, not an error.
    async fn put(
        &self,
        path: &DocPath,
        fields: Map<String, Value>,
        precondition: WritePrecondition,
    ) -> Result<WriteResult>;

    /// Applies a batch of mutations atomically.
    ///
    /// Either every operation applies or none does.
    async fn commit(&self, batch: Vec<WriteOp>) -> Result<()>;

    /// Finds direct documents of `collection` matching `filter`.
    ///
    /// Result order is arbitrary.
    async fn find(&self, collection: &str, filter: Filter) -> Result<Vec<Document>>;
}

/// In-memory document store for testing and local development.
///
/// Thread-safe via `RwLock`. Not suitable for production. Enforces the
/// external store's in-query limit on `IdIn` and `ArrayContainsAny`
/// filters so that callers exercise their batching discipline in tests.
#[derive(Debug)]
pub struct MemoryStore {
    docs: Arc<RwLock<HashMap<String, StoredDoc>>>,
    in_filter_limit: usize,
}

#[derive(Debug, Clone)]
struct StoredDoc {
    fields: Map<String, Value>,
    /// Numeric version stored as i64 internally, exposed as String via API.
    version: i64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a new empty store with the default in-query limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            docs: Arc::new(RwLock::new(HashMap::new())),
            in_filter_limit: crate::batch::DEFAULT_IN_QUERY_LIMIT,
        }
    }

    /// Creates a store with a custom in-query limit (tests only).
    #[must_use]
    pub fn with_in_filter_limit(limit: usize) -> Self {
        Self {
            docs: Arc::new(RwLock::new(HashMap::new())),
            in_filter_limit: limit,
        }
    }

    fn lock_err() -> Error {
        Error::internal("document store lock poisoned")
    }

    fn snapshot(path: &str, doc: &StoredDoc) -> Document {
        Document {
            path: DocPath::from_raw(path),
            fields: doc.fields.clone(),
            version: doc.version.to_string(),
        }
    }

    fn apply_op(docs: &mut HashMap<String, StoredDoc>, op: WriteOp) {
        match op {
            WriteOp::Merge { path, fields } => {
                let entry = docs.entry(path.as_str().to_string()).or_insert(StoredDoc {
                    fields: Map::new(),
                    version: 0,
                });
                for (key, value) in fields {
                    entry.fields.insert(key, value);
                }
                entry.version += 1;
            }
            WriteOp::ArrayUnion {
                path,
                field,
                values,
            } => {
                let entry = docs.entry(path.as_str().to_string()).or_insert(StoredDoc {
                    fields: Map::new(),
                    version: 0,
                });
                let current = entry.fields.entry(field).or_insert(Value::Array(vec![]));
                if !current.is_array() {
                    *current = Value::Array(vec![]);
                }
                if let Value::Array(items) = current {
                    for value in values {
                        if !items.contains(&value) {
                            items.push(value);
                        }
                    }
                }
                entry.version += 1;
            }
            WriteOp::ArrayRemove {
                path,
                field,
                values,
            } => {
                if let Some(entry) = docs.get_mut(path.as_str()) {
                    if let Some(Value::Array(items)) = entry.fields.get_mut(&field) {
                        items.retain(|item| !values.contains(item));
                        entry.version += 1;
                    }
                }
            }
            WriteOp::DeleteField { path, field } => {
                if let Some(entry) = docs.get_mut(path.as_str()) {
                    if entry.fields.remove(&field).is_some() {
                        entry.version += 1;
                    }
                }
            }
        }
    }

    fn matches(doc: &StoredDoc, filter: &Filter, doc_id: &str) -> bool {
        match filter {
            Filter::FieldEq { field, value } => doc.fields.get(field) == Some(value),
            Filter::ArrayContains { field, value } => doc
                .fields
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
            Filter::ArrayContainsAny { field, values } => doc
                .fields
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| values.iter().any(|v| items.contains(v))),
            Filter::IdIn { ids } => ids.iter().any(|id| id == doc_id),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>> {
        let docs = self.docs.read().map_err(|_| Self::lock_err())?;
        Ok(docs
            .get(path.as_str())
            .map(|doc| Self::snapshot(path.as_str(), doc)))
    }

    async fn put(
        &self,
        path: &DocPath,
        fields: Map<String, Value>,
        precondition: WritePrecondition,
    ) -> Result<WriteResult> {
        let mut docs = self.docs.write().map_err(|_| Self::lock_err())?;
        let current = docs.get(path.as_str());

        match precondition {
            WritePrecondition::DoesNotExist => {
                if let Some(doc) = current {
                    return Ok(WriteResult::PreconditionFailed {
                        current_version: doc.version.to_string(),
                    });
                }
            }
            WritePrecondition::MatchesVersion(expected) => {
                let expected_num: i64 = expected.parse().unwrap_or(-1);
                match current {
                    Some(doc) if doc.version != expected_num => {
                        return Ok(WriteResult::PreconditionFailed {
                            current_version: doc.version.to_string(),
                        });
                    }
                    None => {
                        return Ok(WriteResult::PreconditionFailed {
                            current_version: "0".to_string(),
                        });
                    }
                    _ => {}
                }
            }
            WritePrecondition::None => {}
        }

        let new_version = current.map_or(1, |doc| doc.version + 1);
        docs.insert(
            path.as_str().to_string(),
            StoredDoc {
                fields,
                version: new_version,
            },
        );
        drop(docs);

        Ok(WriteResult::Success {
            version: new_version.to_string(),
        })
    }

    async fn commit(&self, batch: Vec<WriteOp>) -> Result<()> {
        // One write lock for the whole batch: the batch is atomic because
        // no reader can observe an intermediate state and no op can fail.
        let mut docs = self.docs.write().map_err(|_| Self::lock_err())?;
        for op in batch {
            Self::apply_op(&mut docs, op);
        }
        drop(docs);
        Ok(())
    }

    async fn find(&self, collection: &str, filter: Filter) -> Result<Vec<Document>> {
        match &filter {
            Filter::IdIn { ids } if ids.len() > self.in_filter_limit => {
                return Err(Error::invalid_argument(format!(
                    "id-in query exceeds the in-query limit ({} > {})",
                    ids.len(),
                    self.in_filter_limit
                )));
            }
            Filter::ArrayContainsAny { values, .. } if values.len() > self.in_filter_limit => {
                return Err(Error::invalid_argument(format!(
                    "array-contains-any query exceeds the in-query limit ({} > {})",
                    values.len(),
                    self.in_filter_limit
                )));
            }
            _ => {}
        }

        let prefix = format!("{collection}/");
        let docs = self.docs.read().map_err(|_| Self::lock_err())?;
        Ok(docs
            .iter()
            .filter_map(|(path, doc)| {
                let doc_id = path.strip_prefix(&prefix)?;
                // Direct children only; sub-documents have more segments.
                if doc_id.contains('/') {
                    return None;
                }
                Self::matches(doc, &filter, doc_id).then(|| Self::snapshot(path, doc))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::collections;
    use crate::id::{GroupId, UserId};
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            panic!("fields must be an object");
        };
        map
    }

    fn user_path(id: &str) -> DocPath {
        DocPath::user(&UserId::new(id).unwrap())
    }

    #[tokio::test]
    async fn put_and_get_roundtrip() {
        let store = MemoryStore::new();
        let path = user_path("u1");

        let result = store
            .put(
                &path,
                fields(json!({"role": "member"})),
                WritePrecondition::None,
            )
            .await
            .expect("put should succeed");
        assert!(matches!(result, WriteResult::Success { ref version } if version == "1"));

        let doc = store
            .get(&path)
            .await
            .expect("get should succeed")
            .expect("document should exist");
        assert_eq!(doc.str_field("role"), Some("member"));
    }

    #[tokio::test]
    async fn precondition_does_not_exist() {
        let store = MemoryStore::new();
        let path = user_path("u1");

        let first = store
            .put(&path, Map::new(), WritePrecondition::DoesNotExist)
            .await
            .unwrap();
        assert!(matches!(first, WriteResult::Success { .. }));

        let second = store
            .put(&path, Map::new(), WritePrecondition::DoesNotExist)
            .await
            .unwrap();
        assert!(matches!(second, WriteResult::PreconditionFailed { .. }));
    }

    #[tokio::test]
    async fn precondition_matches_version() {
        let store = MemoryStore::new();
        let path = user_path("u1");

        let WriteResult::Success { version } = store
            .put(
                &path,
                fields(json!({"n": 1})),
                WritePrecondition::None,
            )
            .await
            .unwrap()
        else {
            panic!("expected success");
        };

        let updated = store
            .put(
                &path,
                fields(json!({"n": 2})),
                WritePrecondition::MatchesVersion(version.clone()),
            )
            .await
            .unwrap();
        assert!(matches!(updated, WriteResult::Success { .. }));

        // Stale version loses.
        let stale = store
            .put(
                &path,
                fields(json!({"n": 3})),
                WritePrecondition::MatchesVersion(version),
            )
            .await
            .unwrap();
        assert!(matches!(stale, WriteResult::PreconditionFailed { .. }));
    }

    #[tokio::test]
    async fn batch_merge_and_array_ops() {
        let store = MemoryStore::new();
        let path = user_path("u1");

        store
            .commit(vec![
                WriteOp::Merge {
                    path: path.clone(),
                    fields: fields(json!({"role": "member", "pushToken": "legacy"})),
                },
                WriteOp::ArrayUnion {
                    path: path.clone(),
                    field: "activeTokens".to_string(),
                    values: vec![json!("t1"), json!("t2"), json!("t1")],
                },
                WriteOp::DeleteField {
                    path: path.clone(),
                    field: "pushToken".to_string(),
                },
            ])
            .await
            .unwrap();

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.string_array_field("activeTokens"), vec!["t1", "t2"]);
        assert_eq!(doc.str_field("role"), Some("member"));
        assert!(doc.str_field("pushToken").is_none());
    }

    #[tokio::test]
    async fn array_remove_is_idempotent_on_missing_targets() {
        let store = MemoryStore::new();
        let path = user_path("ghost");

        // Missing document: no-op, no document created.
        store
            .commit(vec![WriteOp::ArrayRemove {
                path: path.clone(),
                field: "activeTokens".to_string(),
                values: vec![json!("t1")],
            }])
            .await
            .unwrap();
        assert!(store.get(&path).await.unwrap().is_none());

        // Absent value: no-op.
        store
            .commit(vec![WriteOp::ArrayUnion {
                path: path.clone(),
                field: "activeTokens".to_string(),
                values: vec![json!("t2")],
            }])
            .await
            .unwrap();
        store
            .commit(vec![WriteOp::ArrayRemove {
                path: path.clone(),
                field: "activeTokens".to_string(),
                values: vec![json!("t1")],
            }])
            .await
            .unwrap();
        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.string_array_field("activeTokens"), vec!["t2"]);
    }

    #[tokio::test]
    async fn find_field_eq_and_array_contains() {
        let store = MemoryStore::new();
        store
            .commit(vec![
                WriteOp::Merge {
                    path: user_path("u1"),
                    fields: fields(json!({"pushToken": "tok", "activeTokens": ["a"]})),
                },
                WriteOp::Merge {
                    path: user_path("u2"),
                    fields: fields(json!({"activeTokens": ["a", "b"]})),
                },
            ])
            .await
            .unwrap();

        let by_value = store
            .find(
                collections::USERS,
                Filter::FieldEq {
                    field: "pushToken".to_string(),
                    value: json!("tok"),
                },
            )
            .await
            .unwrap();
        assert_eq!(by_value.len(), 1);
        assert_eq!(by_value[0].path.doc_id(), "u1");

        let holders = store
            .find(
                collections::USERS,
                Filter::ArrayContains {
                    field: "activeTokens".to_string(),
                    value: json!("a"),
                },
            )
            .await
            .unwrap();
        assert_eq!(holders.len(), 2);
    }

    #[tokio::test]
    async fn find_excludes_sub_documents() {
        let store = MemoryStore::new();
        let group = GroupId::new("g1").unwrap();
        store
            .commit(vec![
                WriteOp::Merge {
                    path: DocPath::group(&group),
                    fields: fields(json!({"joinCode": "X"})),
                },
                WriteOp::Merge {
                    path: DocPath::group_storage_stats(&group),
                    fields: fields(json!({"joinCode": "X"})),
                },
            ])
            .await
            .unwrap();

        let found = store
            .find(
                collections::GROUPS,
                Filter::FieldEq {
                    field: "joinCode".to_string(),
                    value: json!("X"),
                },
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path.doc_id(), "g1");
    }

    #[tokio::test]
    async fn in_queries_enforce_the_limit() {
        let store = MemoryStore::with_in_filter_limit(2);

        let ids: Vec<String> = (0..3).map(|i| format!("u{i}")).collect();
        let err = store
            .find(collections::USERS, Filter::IdIn { ids })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        let ok = store
            .find(
                collections::USERS,
                Filter::IdIn {
                    ids: vec!["u1".to_string(), "u2".to_string()],
                },
            )
            .await
            .unwrap();
        assert!(ok.is_empty());
    }
}
