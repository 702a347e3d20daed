//! Push transport abstraction.
//!
//! The external push service exposes a single multicast-send capability:
//! one call attempts delivery to many tokens and returns a per-token
//! outcome aligned by index with the input token list. "Unregistered
//! token" is the only outcome this subsystem acts on (token hygiene);
//! everything else is logged and surfaced as transient.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use muster_core::DeviceToken;

use crate::error::{Error, Result};
use crate::message::PushMessage;

/// Per-token failure code reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendErrorCode {
    /// The token is no longer registered with the transport; the owner
    /// must forget it.
    Unregistered,
    /// Any other transport-reported failure (throttling, payload issues).
    Other(String),
}

impl SendErrorCode {
    /// Returns true when the token should be invalidated.
    #[must_use]
    pub const fn is_unregistered(&self) -> bool {
        matches!(self, Self::Unregistered)
    }
}

/// Per-token delivery outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The transport accepted the message for this token.
    Delivered,
    /// The transport rejected this token.
    Failed {
        /// The failure code.
        code: SendErrorCode,
    },
}

/// Result of one multicast send, aligned by index with the input tokens.
#[derive(Debug, Clone)]
pub struct MulticastReport {
    /// One outcome per input token, in input order.
    pub outcomes: Vec<SendOutcome>,
}

impl MulticastReport {
    /// Returns a report where every token was delivered.
    #[must_use]
    pub fn all_delivered(count: usize) -> Self {
        Self {
            outcomes: vec![SendOutcome::Delivered; count],
        }
    }

    /// Number of delivered outcomes.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SendOutcome::Delivered))
            .count()
    }
}

/// The multicast-send capability required of the external push service.
#[async_trait]
pub trait PushTransport: Send + Sync + 'static {
    /// Sends one multicast to all `tokens`.
    ///
    /// The returned report is aligned by index with `tokens`. A wholesale
    /// failure (network, auth) is an error; per-token rejections are not.
    async fn send_multicast(
        &self,
        tokens: &[DeviceToken],
        message: &PushMessage,
    ) -> Result<MulticastReport>;
}

/// A transport that drops every message and reports success.
///
/// Used for local development when no push service is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTransport;

#[async_trait]
impl PushTransport for NoopTransport {
    async fn send_multicast(
        &self,
        tokens: &[DeviceToken],
        message: &PushMessage,
    ) -> Result<MulticastReport> {
        tracing::debug!(
            tokens = tokens.len(),
            kind = ?message.kind,
            "noop transport dropped multicast"
        );
        Ok(MulticastReport::all_delivered(tokens.len()))
    }
}

/// One recorded multicast call.
#[derive(Debug, Clone)]
pub struct RecordedSend {
    /// The tokens passed to the call.
    pub tokens: Vec<DeviceToken>,
    /// The payload passed to the call.
    pub message: PushMessage,
}

enum ScriptedReply {
    Outcomes(Vec<SendOutcome>),
    Fail(String),
}

/// In-memory push transport for testing.
///
/// Records every send and replies with scripted outcomes; unscripted
/// calls report full delivery. Outcome scripts shorter than the token
/// list are padded with [`SendOutcome::Delivered`].
#[derive(Default)]
pub struct MemoryTransport {
    sends: Mutex<Vec<RecordedSend>>,
    script: Mutex<VecDeque<ScriptedReply>>,
}

impl MemoryTransport {
    /// Creates a new transport with no scripted replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the per-token outcomes of the next unscripted call.
    ///
    /// # Panics
    ///
    /// Panics if the script lock is poisoned (test-only type).
    pub fn script_outcomes(&self, outcomes: Vec<SendOutcome>) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(ScriptedReply::Outcomes(outcomes));
    }

    /// Scripts a wholesale transport failure for the next call.
    ///
    /// # Panics
    ///
    /// Panics if the script lock is poisoned (test-only type).
    pub fn script_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(ScriptedReply::Fail(message.into()));
    }

    /// Returns every recorded send, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the sends lock is poisoned (test-only type).
    #[must_use]
    pub fn sends(&self) -> Vec<RecordedSend> {
        self.sends.lock().expect("sends lock poisoned").clone()
    }
}

#[async_trait]
impl PushTransport for MemoryTransport {
    async fn send_multicast(
        &self,
        tokens: &[DeviceToken],
        message: &PushMessage,
    ) -> Result<MulticastReport> {
        self.sends
            .lock()
            .map_err(|_| Error::transport("memory transport lock poisoned"))?
            .push(RecordedSend {
                tokens: tokens.to_vec(),
                message: message.clone(),
            });

        let scripted = self
            .script
            .lock()
            .map_err(|_| Error::transport("memory transport lock poisoned"))?
            .pop_front();

        match scripted {
            Some(ScriptedReply::Fail(message)) => Err(Error::transport(message)),
            Some(ScriptedReply::Outcomes(mut outcomes)) => {
                outcomes.resize(tokens.len(), SendOutcome::Delivered);
                Ok(MulticastReport { outcomes })
            }
            None => Ok(MulticastReport::all_delivered(tokens.len())),
        }
    }
}
