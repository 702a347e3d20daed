//! Token attach/detach callable endpoints.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiErrorBody, ApiResult};
use crate::routes::common::{parse_token, parse_user_id};
use crate::state::AppState;

/// Request payload for token attach/detach.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    /// The user whose token set is modified.
    pub user_id: Option<String>,
    /// The device token.
    pub token: Option<String>,
}

/// Response payload for token attach/detach.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Always true on success.
    pub success: bool,
}

/// Token route group.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tokens/attach", post(attach_token))
        .route("/tokens/detach", post(detach_token))
}

/// `POST /v1/tokens/attach`
///
/// Attaches the token to the user, detaching it from every other owner
/// in the same atomic batch.
#[utoipa::path(
    post,
    path = "/v1/tokens/attach",
    tag = "Tokens",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token attached", body = TokenResponse),
        (status = 400, description = "Missing or malformed argument", body = ApiErrorBody),
        (status = 503, description = "Store unreachable", body = ApiErrorBody),
    )
)]
pub async fn attach_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = parse_user_id(request.user_id, "userId")?;
    let token = parse_token(request.token, "token")?;
    state.registry.attach(&user, &token).await?;
    Ok(Json(TokenResponse { success: true }))
}

/// `POST /v1/tokens/detach`
///
/// Removes the token from the user's set. Idempotent.
#[utoipa::path(
    post,
    path = "/v1/tokens/detach",
    tag = "Tokens",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token detached", body = TokenResponse),
        (status = 400, description = "Missing or malformed argument", body = ApiErrorBody),
        (status = 503, description = "Store unreachable", body = ApiErrorBody),
    )
)]
pub async fn detach_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = parse_user_id(request.user_id, "userId")?;
    let token = parse_token(request.token, "token")?;
    state.registry.detach(&user, &token).await?;
    Ok(Json(TokenResponse { success: true }))
}
