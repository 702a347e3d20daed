//! Notification callable endpoints.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiErrorBody, ApiResult};
use crate::routes::common::parse_group_id;
use crate::state::AppState;

/// Reason reported when an alert had nobody to reach.
const NO_TOKENS: &str = "NO_TOKENS";

/// Request payload for sending a group alert.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupAlertRequest {
    /// The group whose honoree is alerted.
    pub group_id: Option<String>,
}

/// Response payload for a group alert.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupAlertResponse {
    /// Whether anything was handed to the transport.
    pub success: bool,
    /// Number of tokens the transport accepted the alert for.
    pub sent: usize,
    /// Set to `NO_TOKENS` when the honoree had no active tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Notification route group.
pub fn routes() -> Router<AppState> {
    Router::new().route("/notifications/group-alert", post(send_group_alert))
}

/// `POST /v1/notifications/group-alert`
///
/// Sends the group-activity alert to the group's honoree. An honoree
/// without active tokens is reported, not an error.
#[utoipa::path(
    post,
    path = "/v1/notifications/group-alert",
    tag = "Notifications",
    request_body = GroupAlertRequest,
    responses(
        (status = 200, description = "Alert processed", body = GroupAlertResponse),
        (status = 400, description = "Missing or malformed argument", body = ApiErrorBody),
        (status = 404, description = "Group not found", body = ApiErrorBody),
        (status = 503, description = "Store or transport unreachable", body = ApiErrorBody),
    )
)]
pub async fn send_group_alert(
    State(state): State<AppState>,
    Json(request): Json<GroupAlertRequest>,
) -> ApiResult<Json<GroupAlertResponse>> {
    let group = parse_group_id(request.group_id, "groupId")?;
    let summary = state.fanout.notify_group_alert(&group).await?;

    let attempted = summary.delivered + summary.failed;
    Ok(Json(GroupAlertResponse {
        success: attempted > 0,
        sent: summary.delivered,
        reason: (attempted == 0).then(|| NO_TOKENS.to_string()),
    }))
}
