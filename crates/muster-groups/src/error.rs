//! Error types for the group domain.

use muster_core::GroupId;

/// The result type used throughout muster-groups.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in group operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No group carries the presented join code.
    #[error("no group matches the presented join code")]
    UnknownJoinCode {
        /// The code that was presented.
        code: String,
    },

    /// More than one group carries the presented join code.
    ///
    /// The store does not enforce join-code uniqueness; joining an
    /// arbitrary match would route the user into the wrong group, so the
    /// conflict is surfaced instead.
    #[error("join code matches more than one group")]
    DuplicateJoinCode {
        /// The code that was presented.
        code: String,
    },

    /// A storage counter update kept losing its transaction.
    #[error("storage counter update for group {group} abandoned after {attempts} contended attempts")]
    CounterContention {
        /// The group whose counter was contended.
        group: GroupId,
        /// Number of attempts made before giving up.
        attempts: usize,
    },

    /// An error from muster-core.
    #[error(transparent)]
    Core(#[from] muster_core::Error),
}
