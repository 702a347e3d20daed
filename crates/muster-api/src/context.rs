//! Request context extraction.
//!
//! Caller identity arrives in the `x-caller-uid` header, placed there by
//! the authenticating gateway in front of this service. Endpoints whose
//! identity argument is implicit (joining a group) extract
//! [`CallerIdentity`]; its absence is an `UNAUTHENTICATED` failure before
//! any handler logic runs.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use ulid::Ulid;

use muster_core::UserId;

use crate::error::ApiError;

/// Header carrying the gateway-verified caller identity.
pub const CALLER_UID_HEADER: &str = "x-caller-uid";

/// Header carrying the request ID for tracing/correlation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The authenticated caller, extracted from the gateway header.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(CALLER_UID_HEADER) else {
            return Err(ApiError::unauthenticated(format!(
                "missing {CALLER_UID_HEADER} header"
            )));
        };
        let raw = value.to_str().map_err(|_| {
            ApiError::unauthenticated(format!("malformed {CALLER_UID_HEADER} header"))
        })?;
        let user = UserId::new(raw).map_err(|_| {
            ApiError::unauthenticated(format!("malformed {CALLER_UID_HEADER} header"))
        })?;
        Ok(Self(user))
    }
}

/// Returns the request ID from headers, or generates one.
#[must_use]
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| Ulid::new().to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn request_id_is_taken_from_the_header_when_present() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-1"));
        assert_eq!(request_id(&headers), "req-1");
    }

    #[test]
    fn request_id_is_generated_when_absent() {
        let id = request_id(&HeaderMap::new());
        assert!(!id.is_empty());
        assert!(Ulid::from_string(&id).is_ok());
    }
}
