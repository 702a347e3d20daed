//! Notification dispatch and token hygiene.
//!
//! One dispatch = one multicast call. The per-token report decides what
//! happens next: unregistered tokens are stripped from their owners via a
//! single registry call, other failures are logged and counted. This
//! layer never retries — the surrounding trigger infrastructure owns
//! redelivery.

use std::sync::Arc;

use muster_core::DeviceToken;

use crate::error::{Error, Result};
use crate::message::PushMessage;
use crate::registry::TokenRegistry;
use crate::transport::{PushTransport, SendOutcome};

/// Counter: notifications accepted by the transport.
pub const NOTIFICATIONS_SENT: &str = "notifications_sent_total";

/// Counter: tokens invalidated after transport feedback.
pub const NOTIFICATIONS_INVALID_TOKENS: &str = "notifications_invalid_tokens_total";

/// Outcome summary of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Tokens the transport accepted the message for.
    pub delivered: usize,
    /// Tokens the transport rejected, for any reason.
    pub failed: usize,
    /// Rejected tokens that were unregistered and have been invalidated.
    pub invalidated: usize,
}

impl DispatchSummary {
    /// A summary for a dispatch that was skipped (no recipients).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            delivered: 0,
            failed: 0,
            invalidated: 0,
        }
    }
}

/// Sends payloads and feeds transport feedback back into the registry.
#[derive(Clone)]
pub struct NotificationDispatcher {
    transport: Arc<dyn PushTransport>,
    registry: TokenRegistry,
}

impl NotificationDispatcher {
    /// Creates a dispatcher over the given transport and registry.
    #[must_use]
    pub fn new(transport: Arc<dyn PushTransport>, registry: TokenRegistry) -> Self {
        Self {
            transport,
            registry,
        }
    }

    /// Sends one multicast and applies token hygiene from its report.
    ///
    /// Every outcome reporting an unregistered token contributes to a
    /// single `invalidate_many` call — exactly one per dispatch. Other
    /// failures are logged and surface only in the summary.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the multicast call itself fails or
    /// its report is not aligned with the input tokens.
    #[tracing::instrument(skip_all, fields(kind = ?message.kind, tokens = tokens.len()))]
    pub async fn dispatch(
        &self,
        tokens: &[DeviceToken],
        message: &PushMessage,
    ) -> Result<DispatchSummary> {
        let report = self.transport.send_multicast(tokens, message).await?;
        if report.outcomes.len() != tokens.len() {
            return Err(Error::transport(format!(
                "multicast report is misaligned: {} outcomes for {} tokens",
                report.outcomes.len(),
                tokens.len()
            )));
        }

        let mut summary = DispatchSummary::default();
        let mut invalid = Vec::new();
        for (token, outcome) in tokens.iter().zip(&report.outcomes) {
            match outcome {
                SendOutcome::Delivered => summary.delivered += 1,
                SendOutcome::Failed { code } => {
                    summary.failed += 1;
                    if code.is_unregistered() {
                        invalid.push(token.clone());
                    } else {
                        tracing::warn!(?code, "push delivery failed for token");
                    }
                }
            }
        }

        if !invalid.is_empty() {
            summary.invalidated = invalid.len();
            self.registry.invalidate_many(&invalid).await?;
        }

        metrics::counter!(NOTIFICATIONS_SENT).increment(summary.delivered as u64);
        metrics::counter!(NOTIFICATIONS_INVALID_TOKENS).increment(summary.invalidated as u64);
        tracing::info!(
            delivered = summary.delivered,
            failed = summary.failed,
            invalidated = summary.invalidated,
            "notification dispatch complete"
        );
        Ok(summary)
    }
}
