//! OpenAPI document for the Muster API.

use utoipa::OpenApi;

use crate::error::ApiErrorBody;
use crate::routes::groups::{JoinGroupRequest, JoinGroupResponse};
use crate::routes::hooks::{
    ChatHookAck, ChatMessageCreatedHook, GroupCreatedHook, HookAck, ObjectEventHook,
};
use crate::routes::notifications::{GroupAlertRequest, GroupAlertResponse};
use crate::routes::tokens::{TokenRequest, TokenResponse};

/// OpenAPI specification for every callable and hook endpoint.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Muster API",
        description = "Event-reaction layer for group-event coordination: \
            notification fan-out, token lifecycle, and storage accounting."
    ),
    paths(
        crate::routes::tokens::attach_token,
        crate::routes::tokens::detach_token,
        crate::routes::groups::join_group,
        crate::routes::notifications::send_group_alert,
        crate::routes::hooks::group_created,
        crate::routes::hooks::chat_message_created,
        crate::routes::hooks::object_finalized,
        crate::routes::hooks::object_deleted,
    ),
    components(schemas(
        TokenRequest,
        TokenResponse,
        JoinGroupRequest,
        JoinGroupResponse,
        GroupAlertRequest,
        GroupAlertResponse,
        GroupCreatedHook,
        ChatMessageCreatedHook,
        ObjectEventHook,
        HookAck,
        ChatHookAck,
        ApiErrorBody,
    )),
    tags(
        (name = "Tokens", description = "Device token lifecycle"),
        (name = "Groups", description = "Group membership"),
        (name = "Notifications", description = "Explicit notification sends"),
        (name = "Hooks", description = "Store and blob trigger deliveries"),
    )
)]
pub struct ApiDoc;
