//! Group membership callable endpoints.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::context::CallerIdentity;
use crate::error::{ApiErrorBody, ApiResult};
use crate::routes::common::parse_join_code;
use crate::state::AppState;

/// Request payload for joining a group by code.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupRequest {
    /// The join code shared with the caller.
    pub code: Option<String>,
}

/// Response payload for joining a group.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupResponse {
    /// The group the caller was added to.
    pub group_id: String,
}

/// Group route group.
pub fn routes() -> Router<AppState> {
    Router::new().route("/groups/join", post(join_group))
}

/// `POST /v1/groups/join`
///
/// Adds the authenticated caller to the group whose join code matches.
/// Repeated calls are no-ops.
#[utoipa::path(
    post,
    path = "/v1/groups/join",
    tag = "Groups",
    request_body = JoinGroupRequest,
    responses(
        (status = 200, description = "Joined", body = JoinGroupResponse),
        (status = 400, description = "Missing or malformed code", body = ApiErrorBody),
        (status = 401, description = "Missing caller identity", body = ApiErrorBody),
        (status = 404, description = "Unknown join code", body = ApiErrorBody),
        (status = 409, description = "Join code is not unique", body = ApiErrorBody),
    )
)]
pub async fn join_group(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(request): Json<JoinGroupRequest>,
) -> ApiResult<Json<JoinGroupResponse>> {
    let code = parse_join_code(request.code, "code")?;
    let group = state.directory.join_by_code(&caller.0, &code).await?;
    Ok(Json(JoinGroupResponse {
        group_id: group.to_string(),
    }))
}
