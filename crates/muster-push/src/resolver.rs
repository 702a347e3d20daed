//! Recipient resolution for group notifications.
//!
//! Chat messages fan out to every member except the sender — and except
//! the group's honoree, who must not see the planning chat. Group alerts
//! invert that rule: they target exactly the honoree.
//!
//! Member lookups are chunked to the store's in-query limit and issued
//! with bounded concurrency.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::sync::Arc;

use muster_core::document::collections;
use muster_core::{
    bounded_batches, BatchLimit, DeviceToken, DocPath, Document, DocumentStore, Filter, GroupId,
    GroupRecord, UserId, UserRecord,
};

use crate::error::{Error, Result};

/// Maximum member-lookup queries in flight at once.
const MAX_IN_FLIGHT_LOOKUPS: usize = 4;

/// Resolves the token set a group notification should target.
#[derive(Clone)]
pub struct RecipientResolver {
    store: Arc<dyn DocumentStore>,
    in_query_limit: BatchLimit,
}

impl RecipientResolver {
    /// Creates a resolver over the given store with the default in-query
    /// limit.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_in_query_limit(store, BatchLimit::DEFAULT)
    }

    /// Creates a resolver with a custom in-query limit.
    #[must_use]
    pub fn with_in_query_limit(store: Arc<dyn DocumentStore>, in_query_limit: BatchLimit) -> Self {
        Self {
            store,
            in_query_limit,
        }
    }

    /// Resolves the recipients of a chat message sent to `group`.
    ///
    /// An unknown or deleted group yields an empty set — nothing to
    /// notify, not an error. The sender never receives their own message,
    /// and the group's honoree is excluded only when their own `groupId`
    /// matches this group (an honoree of a *different* group is an
    /// ordinary recipient).
    #[tracing::instrument(skip(self), fields(group = %group))]
    pub async fn chat_recipients(
        &self,
        group: &GroupId,
        sender: &UserId,
    ) -> Result<Vec<DeviceToken>> {
        let Some(doc) = self.store.get(&DocPath::group(group)).await? else {
            return Ok(Vec::new());
        };
        let record: GroupRecord = doc.decode()?;

        let candidates: Vec<String> = record
            .members
            .into_iter()
            .filter(|member| member != sender.as_str())
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.load_users(&candidates).await?;
        let mut tokens = Vec::new();
        let mut seen = HashSet::new();
        for doc in &users {
            let user: UserRecord = doc.decode()?;
            if user.is_honoree_of(group) {
                continue;
            }
            collect_tokens(&user, &mut seen, &mut tokens);
        }
        Ok(tokens)
    }

    /// Resolves the recipients of a group-activity alert: the tokens of
    /// the group's honoree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GroupNotFound`] when the group does not exist —
    /// alerts are requested explicitly, so a vanished group is surfaced.
    #[tracing::instrument(skip(self), fields(group = %group))]
    pub async fn alert_recipients(&self, group: &GroupId) -> Result<Vec<DeviceToken>> {
        let Some(doc) = self.store.get(&DocPath::group(group)).await? else {
            return Err(Error::GroupNotFound {
                group: group.clone(),
            });
        };
        let record: GroupRecord = doc.decode()?;
        if record.members.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.load_users(&record.members).await?;
        let mut tokens = Vec::new();
        let mut seen = HashSet::new();
        for doc in &users {
            let user: UserRecord = doc.decode()?;
            if user.is_honoree_of(group) {
                collect_tokens(&user, &mut seen, &mut tokens);
            }
        }
        Ok(tokens)
    }

    /// Loads user documents by id, in bounded batches with bounded
    /// concurrency.
    async fn load_users(&self, ids: &[String]) -> Result<Vec<Document>> {
        let batches: Vec<Vec<String>> = bounded_batches(ids, self.in_query_limit)
            .map(<[String]>::to_vec)
            .collect();

        let results: Vec<Vec<Document>> = stream::iter(batches.into_iter().map(|ids| {
            let store = Arc::clone(&self.store);
            async move { store.find(collections::USERS, Filter::IdIn { ids }).await }
        }))
        .buffered(MAX_IN_FLIGHT_LOOKUPS)
        .try_collect()
        .await?;

        Ok(results.into_iter().flatten().collect())
    }
}

/// Appends the user's valid tokens, deduplicated across users.
fn collect_tokens(user: &UserRecord, seen: &mut HashSet<String>, out: &mut Vec<DeviceToken>) {
    for raw in &user.active_tokens {
        let Ok(token) = DeviceToken::new(raw.clone()) else {
            // Blank entries written by older clients; skip.
            continue;
        };
        if seen.insert(raw.clone()) {
            out.push(token);
        }
    }
}
