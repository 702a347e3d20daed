//! Self-service group membership via join codes.

use serde_json::Value;
use std::sync::Arc;

use muster_core::document::collections;
use muster_core::records::fields;
use muster_core::{DocumentStore, Filter, GroupId, JoinCode, UserId, WriteOp};

use crate::error::{Error, Result};

/// Resolves join codes and performs membership adds.
#[derive(Clone)]
pub struct GroupDirectory {
    store: Arc<dyn DocumentStore>,
}

impl GroupDirectory {
    /// Creates a directory over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Adds `user` to the group whose join code equals `code`.
    ///
    /// Idempotent: the membership add is a set union, so repeated calls
    /// leave the member list unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownJoinCode`] when no group carries the code
    /// - [`Error::DuplicateJoinCode`] when more than one group does
    #[tracing::instrument(skip(self, code), fields(user = %user))]
    pub async fn join_by_code(&self, user: &UserId, code: &JoinCode) -> Result<GroupId> {
        let mut matches = self
            .store
            .find(
                collections::GROUPS,
                Filter::FieldEq {
                    field: fields::JOIN_CODE.to_string(),
                    value: Value::String(code.as_str().to_string()),
                },
            )
            .await?;

        if matches.len() > 1 {
            return Err(Error::DuplicateJoinCode {
                code: code.as_str().to_string(),
            });
        }
        let Some(doc) = matches.pop() else {
            return Err(Error::UnknownJoinCode {
                code: code.as_str().to_string(),
            });
        };

        let group = GroupId::new(doc.path.doc_id())?;
        self.store
            .commit(vec![WriteOp::ArrayUnion {
                path: doc.path,
                field: fields::MEMBERS.to_string(),
                values: vec![Value::String(user.as_str().to_string())],
            }])
            .await?;

        tracing::info!(group = %group, "user joined group by code");
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_core::{DocPath, MemoryStore};
    use serde_json::json;

    fn user(raw: &str) -> UserId {
        UserId::new(raw).unwrap()
    }

    fn code(raw: &str) -> JoinCode {
        JoinCode::new(raw).unwrap()
    }

    async fn seed_group(store: &MemoryStore, id: &str, doc: Value) {
        let Value::Object(fields) = doc else {
            panic!("seed must be an object");
        };
        store
            .commit(vec![WriteOp::Merge {
                path: DocPath::group(&GroupId::new(id).unwrap()),
                fields,
            }])
            .await
            .unwrap();
    }

    async fn members(store: &MemoryStore, id: &str) -> Vec<String> {
        store
            .get(&DocPath::group(&GroupId::new(id).unwrap()))
            .await
            .unwrap()
            .map(|doc| doc.string_array_field(fields::MEMBERS))
            .unwrap_or_default()
    }

    fn directory(store: &Arc<MemoryStore>) -> GroupDirectory {
        GroupDirectory::new(Arc::clone(store) as Arc<dyn DocumentStore>)
    }

    #[tokio::test]
    async fn joining_twice_adds_the_member_once() {
        let store = Arc::new(MemoryStore::new());
        seed_group(&store, "g1", json!({"joinCode": "CODE", "members": ["a"]})).await;
        let directory = directory(&store);

        let first = directory.join_by_code(&user("b"), &code("CODE")).await.unwrap();
        let second = directory.join_by_code(&user("b"), &code("CODE")).await.unwrap();
        assert_eq!(first, second);

        assert_eq!(members(&store, "g1").await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn unknown_code_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        seed_group(&store, "g1", json!({"joinCode": "CODE"})).await;

        let err = directory(&store)
            .join_by_code(&user("b"), &code("WRONG"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownJoinCode { .. }));
    }

    #[tokio::test]
    async fn duplicate_codes_are_surfaced() {
        let store = Arc::new(MemoryStore::new());
        seed_group(&store, "g1", json!({"joinCode": "CODE"})).await;
        seed_group(&store, "g2", json!({"joinCode": "CODE"})).await;

        let err = directory(&store)
            .join_by_code(&user("b"), &code("CODE"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateJoinCode { .. }));
    }
}
