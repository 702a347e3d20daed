//! Error types for the notification domain.

use muster_core::GroupId;

/// The result type used throughout muster-push.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notification operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The push transport call failed wholesale (network, quota).
    ///
    /// Per-token failures are not errors; they arrive inside the
    /// multicast report.
    #[error("push transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The group referenced by a callable request does not exist.
    #[error("group not found: {group}")]
    GroupNotFound {
        /// The group that was looked up.
        group: GroupId,
    },

    /// An error from muster-core.
    #[error(transparent)]
    Core(#[from] muster_core::Error),
}

impl Error {
    /// Creates a new transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }
}
