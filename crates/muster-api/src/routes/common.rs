//! Shared boundary-validation helpers for route handlers.
//!
//! Request bodies are loosely-typed JSON from external callers; every
//! field is validated here before it reaches domain code, so handlers
//! only ever see well-formed identifiers.

use muster_core::{DeviceToken, GroupId, JoinCode, UserId};

use crate::error::{ApiError, ApiResult};

pub(crate) fn require_field(value: Option<String>, field: &str) -> ApiResult<String> {
    let value = value
        .ok_or_else(|| ApiError::invalid_argument(format!("missing required field: {field}")))?;
    if value.trim().is_empty() {
        return Err(ApiError::invalid_argument(format!(
            "missing required field: {field}"
        )));
    }
    Ok(value)
}

pub(crate) fn parse_user_id(value: Option<String>, field: &str) -> ApiResult<UserId> {
    let raw = require_field(value, field)?;
    UserId::new(raw).map_err(|e| ApiError::invalid_argument(format!("{field}: {e}")))
}

pub(crate) fn parse_group_id(value: Option<String>, field: &str) -> ApiResult<GroupId> {
    let raw = require_field(value, field)?;
    GroupId::new(raw).map_err(|e| ApiError::invalid_argument(format!("{field}: {e}")))
}

pub(crate) fn parse_token(value: Option<String>, field: &str) -> ApiResult<DeviceToken> {
    let raw = require_field(value, field)?;
    DeviceToken::new(raw).map_err(|e| ApiError::invalid_argument(format!("{field}: {e}")))
}

pub(crate) fn parse_join_code(value: Option<String>, field: &str) -> ApiResult<JoinCode> {
    let raw = require_field(value, field)?;
    JoinCode::new(raw).map_err(|e| ApiError::invalid_argument(format!("{field}: {e}")))
}
