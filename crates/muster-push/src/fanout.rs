//! Fan-out composition invoked by triggers and callables.
//!
//! Ties recipient resolution to dispatch with the right silence rules:
//! the chat trigger absorbs vanished groups and empty recipient sets as
//! no-ops, while the group-alert callable surfaces a missing group.

use muster_core::{ChatMessageRecord, GroupId, UserId};

use crate::dispatcher::{DispatchSummary, NotificationDispatcher};
use crate::error::Result;
use crate::message::PushMessage;
use crate::resolver::RecipientResolver;

/// Resolves recipients and dispatches the matching payload.
#[derive(Clone)]
pub struct NotificationFanout {
    resolver: RecipientResolver,
    dispatcher: NotificationDispatcher,
}

impl NotificationFanout {
    /// Creates a fan-out over the given resolver and dispatcher.
    #[must_use]
    pub fn new(resolver: RecipientResolver, dispatcher: NotificationDispatcher) -> Self {
        Self {
            resolver,
            dispatcher,
        }
    }

    /// Reacts to a chat message created in `group`.
    ///
    /// Empty recipient sets — unknown group, sender alone, everyone
    /// excluded — skip dispatch entirely and return an empty summary.
    #[tracing::instrument(skip(self, message), fields(group = %group))]
    pub async fn notify_chat_message(
        &self,
        group: &GroupId,
        sender: &UserId,
        message: &ChatMessageRecord,
    ) -> Result<DispatchSummary> {
        let tokens = self.resolver.chat_recipients(group, sender).await?;
        if tokens.is_empty() {
            tracing::debug!("no chat recipients, skipping dispatch");
            return Ok(DispatchSummary::empty());
        }
        self.dispatcher
            .dispatch(&tokens, &PushMessage::chat_message(&message.text))
            .await
    }

    /// Sends the group-activity alert to the group's honoree.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::GroupNotFound`] when the group does
    /// not exist. An honoree without tokens is not an error; the summary
    /// simply reports nothing delivered.
    #[tracing::instrument(skip(self), fields(group = %group))]
    pub async fn notify_group_alert(&self, group: &GroupId) -> Result<DispatchSummary> {
        let tokens = self.resolver.alert_recipients(group).await?;
        if tokens.is_empty() {
            tracing::debug!("honoree has no active tokens, skipping dispatch");
            return Ok(DispatchSummary::empty());
        }
        self.dispatcher
            .dispatch(&tokens, &PushMessage::group_alert())
            .await
    }
}
