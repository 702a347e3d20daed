//! Token registry: ownership bookkeeping for device push tokens.
//!
//! Invariant: at most one user owns a given token. `attach` enforces this
//! by stripping the token from every other owner (including the legacy
//! single-token field) and adding it to the new owner in **one atomic
//! batch** — no reader can observe a token owned by zero or two users
//! mid-operation.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use muster_core::document::collections;
use muster_core::records::fields;
use muster_core::{bounded_batches, BatchLimit, DeviceToken, DocPath, DocumentStore, Filter, UserId, WriteOp};

use crate::error::Result;

/// Registry of active device tokens per user.
#[derive(Clone)]
pub struct TokenRegistry {
    store: Arc<dyn DocumentStore>,
    in_query_limit: BatchLimit,
}

fn token_value(token: &DeviceToken) -> Value {
    Value::String(token.as_str().to_string())
}

impl TokenRegistry {
    /// Creates a registry over the given store with the default in-query
    /// limit.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_in_query_limit(store, BatchLimit::DEFAULT)
    }

    /// Creates a registry with a custom in-query limit.
    #[must_use]
    pub fn with_in_query_limit(store: Arc<dyn DocumentStore>, in_query_limit: BatchLimit) -> Self {
        Self {
            store,
            in_query_limit,
        }
    }

    /// Attaches `token` to `user`, detaching it from every other owner.
    ///
    /// All removals and the addition are committed as one atomic batch.
    /// The legacy single-token field is cleared wherever the token value
    /// is found, and always on the target user.
    ///
    /// # Errors
    ///
    /// Returns a transient error when the store is unreachable.
    #[tracing::instrument(skip(self, token), fields(user = %user))]
    pub async fn attach(&self, user: &UserId, token: &DeviceToken) -> Result<()> {
        let mut batch = Vec::new();

        let holders = self
            .store
            .find(
                collections::USERS,
                Filter::ArrayContains {
                    field: fields::ACTIVE_TOKENS.to_string(),
                    value: token_value(token),
                },
            )
            .await?;
        for doc in holders {
            if doc.path.doc_id() != user.as_str() {
                batch.push(WriteOp::ArrayRemove {
                    path: doc.path,
                    field: fields::ACTIVE_TOKENS.to_string(),
                    values: vec![token_value(token)],
                });
            }
        }

        let legacy_holders = self
            .store
            .find(
                collections::USERS,
                Filter::FieldEq {
                    field: fields::LEGACY_PUSH_TOKEN.to_string(),
                    value: token_value(token),
                },
            )
            .await?;
        for doc in legacy_holders {
            if doc.path.doc_id() != user.as_str() {
                batch.push(WriteOp::DeleteField {
                    path: doc.path,
                    field: fields::LEGACY_PUSH_TOKEN.to_string(),
                });
            }
        }

        let target = DocPath::user(user);
        batch.push(WriteOp::ArrayUnion {
            path: target.clone(),
            field: fields::ACTIVE_TOKENS.to_string(),
            values: vec![token_value(token)],
        });
        batch.push(WriteOp::DeleteField {
            path: target,
            field: fields::LEGACY_PUSH_TOKEN.to_string(),
        });

        self.store.commit(batch).await?;
        Ok(())
    }

    /// Detaches `token` from `user` only.
    ///
    /// Idempotent: removing an absent token (or detaching from a missing
    /// user document) is a no-op, not an error.
    #[tracing::instrument(skip(self, token), fields(user = %user))]
    pub async fn detach(&self, user: &UserId, token: &DeviceToken) -> Result<()> {
        let target = DocPath::user(user);
        self.store
            .commit(vec![
                WriteOp::ArrayRemove {
                    path: target.clone(),
                    field: fields::ACTIVE_TOKENS.to_string(),
                    values: vec![token_value(token)],
                },
                WriteOp::DeleteField {
                    path: target,
                    field: fields::LEGACY_PUSH_TOKEN.to_string(),
                },
            ])
            .await?;
        Ok(())
    }

    /// Removes every listed token from every user whose set contains any
    /// of them, as one atomic batch.
    ///
    /// Lookup queries are chunked by the store's in-query limit; the
    /// resulting removals still commit together.
    #[tracing::instrument(skip_all, fields(tokens = tokens.len()))]
    pub async fn invalidate_many(&self, tokens: &[DeviceToken]) -> Result<()> {
        if tokens.is_empty() {
            return Ok(());
        }

        let values: Vec<Value> = tokens.iter().map(token_value).collect();

        let mut batch = Vec::new();
        let mut seen = HashSet::new();
        for chunk in bounded_batches(&values, self.in_query_limit) {
            let holders = self
                .store
                .find(
                    collections::USERS,
                    Filter::ArrayContainsAny {
                        field: fields::ACTIVE_TOKENS.to_string(),
                        values: chunk.to_vec(),
                    },
                )
                .await?;
            for doc in holders {
                // A user can match several chunks; remove once.
                if seen.insert(doc.path.clone()) {
                    batch.push(WriteOp::ArrayRemove {
                        path: doc.path,
                        field: fields::ACTIVE_TOKENS.to_string(),
                        values: values.clone(),
                    });
                }
            }
        }

        if !batch.is_empty() {
            self.store.commit(batch).await?;
        }
        Ok(())
    }
}
