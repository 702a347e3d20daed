//! Error types and result aliases for Muster.
//!
//! This module defines the shared error taxonomy used across all Muster
//! components. Errors are structured for programmatic handling: callable
//! entry points map them onto stable HTTP codes, while background triggers
//! decide per-variant whether to absorb or resurface them.

use std::fmt;

/// The result type used throughout Muster.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Muster operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was missing or malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of what made the argument invalid.
        message: String,
    },

    /// The caller did not present a verified identity.
    #[error("unauthenticated: {message}")]
    Unauthenticated {
        /// Description of the missing identity.
        message: String,
    },

    /// The referenced resource was not found.
    #[error("not found: {resource_type} with id {id}")]
    NotFound {
        /// The type of resource that was not found.
        resource_type: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The external store or transport was unreachable or contended.
    ///
    /// Never retried internally; the surrounding trigger/request
    /// infrastructure owns the retry policy.
    #[error("transient infrastructure failure: {message}")]
    Transient {
        /// Description of the failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Stored data violates an invariant this subsystem relies on.
    #[error("data integrity violation: {message}")]
    DataIntegrity {
        /// Description of the violation.
        message: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new invalid-argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a new unauthenticated error.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Creates a new not-found error.
    #[must_use]
    pub fn not_found(resource_type: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a new transient error with the given message.
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new transient error with a source cause.
    #[must_use]
    pub fn transient_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transient {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new data-integrity error.
    #[must_use]
    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            message: message.into(),
        }
    }

    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
