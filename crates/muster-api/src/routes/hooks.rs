//! Trigger hook endpoints.
//!
//! The store/blob trigger infrastructure delivers change events to these
//! endpoints. Trigger semantics differ from callables: vanished targets
//! and unmatched paths are absorbed as no-op `200`s, while transient
//! failures surface as `503` so the infrastructure's retry policy kicks
//! in. Events may be redelivered; every handler is idempotent or
//! transactional.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use muster_core::ChatMessageRecord;
use muster_groups::{LedgerUpdate, ObjectEvent};

use crate::error::{ApiErrorBody, ApiResult};
use crate::routes::common::{parse_group_id, parse_user_id};
use crate::state::AppState;

/// A group-created document trigger.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreatedHook {
    /// The created group.
    pub group_id: Option<String>,
}

/// A chat-message-created document trigger.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageCreatedHook {
    /// The group the message belongs to.
    pub group_id: Option<String>,
    /// The sending user.
    pub sender_id: Option<String>,
    /// The message text.
    #[serde(default)]
    pub text: String,
}

/// An object finalize/delete storage trigger.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEventHook {
    /// Full object path within the bucket.
    pub object_path: Option<String>,
    /// Object size in bytes.
    #[serde(default)]
    pub size_bytes: u64,
}

/// Acknowledgement for document triggers.
#[derive(Debug, Serialize, ToSchema)]
pub struct HookAck {
    /// Whether the event had any effect.
    pub handled: bool,
}

/// Acknowledgement for the chat trigger.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatHookAck {
    /// Tokens the transport accepted the message for.
    pub delivered: usize,
}

/// Hook route group.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hooks/groups/created", post(group_created))
        .route("/hooks/chat/message-created", post(chat_message_created))
        .route("/hooks/storage/object-finalized", post(object_finalized))
        .route("/hooks/storage/object-deleted", post(object_deleted))
}

/// `POST /v1/hooks/groups/created`
///
/// Seeds the group's storage stats. Redelivery is a no-op.
#[utoipa::path(
    post,
    path = "/v1/hooks/groups/created",
    tag = "Hooks",
    request_body = GroupCreatedHook,
    responses(
        (status = 200, description = "Stats provisioned", body = HookAck),
        (status = 400, description = "Malformed event", body = ApiErrorBody),
        (status = 503, description = "Store unreachable", body = ApiErrorBody),
    )
)]
pub async fn group_created(
    State(state): State<AppState>,
    Json(event): Json<GroupCreatedHook>,
) -> ApiResult<Json<HookAck>> {
    let group = parse_group_id(event.group_id, "groupId")?;
    state.provisioner.on_group_created(&group).await?;
    Ok(Json(HookAck { handled: true }))
}

/// `POST /v1/hooks/chat/message-created`
///
/// Fans the message out to the group's members, excluding the sender and
/// the group's honoree. An unknown group or empty recipient set is a
/// silent no-op.
#[utoipa::path(
    post,
    path = "/v1/hooks/chat/message-created",
    tag = "Hooks",
    request_body = ChatMessageCreatedHook,
    responses(
        (status = 200, description = "Fan-out processed", body = ChatHookAck),
        (status = 400, description = "Malformed event", body = ApiErrorBody),
        (status = 503, description = "Store or transport unreachable", body = ApiErrorBody),
    )
)]
pub async fn chat_message_created(
    State(state): State<AppState>,
    Json(event): Json<ChatMessageCreatedHook>,
) -> ApiResult<Json<ChatHookAck>> {
    let group = parse_group_id(event.group_id, "groupId")?;
    let sender = parse_user_id(event.sender_id, "senderId")?;
    let message = ChatMessageRecord {
        sender_id: sender.to_string(),
        text: event.text,
    };
    let summary = state
        .fanout
        .notify_chat_message(&group, &sender, &message)
        .await?;
    Ok(Json(ChatHookAck {
        delivered: summary.delivered,
    }))
}

/// `POST /v1/hooks/storage/object-finalized`
///
/// Adds the object's size to its group's storage counter. Objects
/// outside the upload grammar — including events with no usable path —
/// are ignored.
#[utoipa::path(
    post,
    path = "/v1/hooks/storage/object-finalized",
    tag = "Hooks",
    request_body = ObjectEventHook,
    responses(
        (status = 200, description = "Event processed", body = HookAck),
        (status = 503, description = "Store unreachable", body = ApiErrorBody),
    )
)]
pub async fn object_finalized(
    State(state): State<AppState>,
    Json(event): Json<ObjectEventHook>,
) -> ApiResult<Json<HookAck>> {
    let Some(event) = object_event(event) else {
        return Ok(Json(HookAck { handled: false }));
    };
    let update = state.ledger.record_finalized(&event).await?;
    Ok(Json(HookAck {
        handled: matches!(update, LedgerUpdate::Applied { .. }),
    }))
}

/// `POST /v1/hooks/storage/object-deleted`
///
/// Subtracts the object's size from its group's storage counter,
/// flooring at zero. Objects outside the upload grammar — including
/// events with no usable path — are ignored.
#[utoipa::path(
    post,
    path = "/v1/hooks/storage/object-deleted",
    tag = "Hooks",
    request_body = ObjectEventHook,
    responses(
        (status = 200, description = "Event processed", body = HookAck),
        (status = 503, description = "Store unreachable", body = ApiErrorBody),
    )
)]
pub async fn object_deleted(
    State(state): State<AppState>,
    Json(event): Json<ObjectEventHook>,
) -> ApiResult<Json<HookAck>> {
    let Some(event) = object_event(event) else {
        return Ok(Json(HookAck { handled: false }));
    };
    let update = state.ledger.record_deleted(&event).await?;
    Ok(Json(HookAck {
        handled: matches!(update, LedgerUpdate::Applied { .. }),
    }))
}

fn object_event(hook: ObjectEventHook) -> Option<ObjectEvent> {
    let object_path = hook.object_path?;
    if object_path.trim().is_empty() {
        return None;
    }
    Some(ObjectEvent {
        object_path,
        size_bytes: hook.size_bytes,
    })
}
