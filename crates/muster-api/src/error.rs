//! API error types and HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Standard JSON error response body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Stable machine-readable error code.
    pub code: String,
    /// Human-readable message (safe for clients).
    pub message: String,
    /// Optional request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// HTTP API error with a stable machine-readable code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    request_id: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            request_id: None,
        }
    }

    /// Returns an error response for invalid input.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", message)
    }

    /// Returns an error response for missing caller identity.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", message)
    }

    /// Returns an error response for missing targets.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Returns an error response for data-integrity conflicts.
    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "DATA_INTEGRITY", message)
    }

    /// Returns an error response for transient infrastructure failures.
    ///
    /// The trigger/request infrastructure retries on this status.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", message)
    }

    /// Returns an opaque internal error response.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "internal error",
        )
    }

    /// Attaches a request ID for correlation.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns the HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            code: self.code.to_string(),
            message: self.message,
            request_id: self.request_id,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<muster_core::Error> for ApiError {
    fn from(error: muster_core::Error) -> Self {
        use muster_core::Error as Core;
        match &error {
            Core::InvalidArgument { .. } => Self::invalid_argument(error.to_string()),
            Core::Unauthenticated { .. } => Self::unauthenticated(error.to_string()),
            Core::NotFound { .. } => Self::not_found(error.to_string()),
            Core::Transient { .. } => Self::unavailable(error.to_string()),
            Core::DataIntegrity { .. } => Self::data_integrity(error.to_string()),
            Core::Serialization { .. } | Core::Internal { .. } => {
                tracing::error!(%error, "internal error reached the API boundary");
                Self::internal()
            }
        }
    }
}

impl From<muster_push::Error> for ApiError {
    fn from(error: muster_push::Error) -> Self {
        use muster_push::Error as Push;
        match error {
            Push::Transport { .. } => Self::unavailable(error.to_string()),
            Push::GroupNotFound { .. } => Self::not_found(error.to_string()),
            Push::Core(core) => core.into(),
        }
    }
}

impl From<muster_groups::Error> for ApiError {
    fn from(error: muster_groups::Error) -> Self {
        use muster_groups::Error as Groups;
        match error {
            Groups::UnknownJoinCode { .. } => Self::not_found(error.to_string()),
            Groups::DuplicateJoinCode { .. } => Self::data_integrity(error.to_string()),
            Groups::CounterContention { .. } => Self::unavailable(error.to_string()),
            Groups::Core(core) => core.into(),
        }
    }
}
