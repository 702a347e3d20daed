//! # muster-api
//!
//! HTTP composition layer for the Muster group-event coordination
//! backend.
//!
//! This crate is a **thin composition layer** with no domain policy. All
//! business logic lives in `muster-push` and `muster-groups`; this crate
//! handles:
//!
//! - **Routing**: callable entry points and trigger hook endpoints
//! - **Boundary Validation**: loosely-typed request bodies become typed
//!   identifiers before touching domain code
//! - **Error Mapping**: the shared taxonomy onto stable HTTP codes
//! - **Observability**: request metrics, tracing, and health checks
//!
//! ## Endpoints
//!
//! ```text
//! GET  /health                            - Health check
//! GET  /ready                             - Readiness check
//! GET  /metrics                           - Prometheus render
//! POST /v1/tokens/attach                  - Attach a device token
//! POST /v1/tokens/detach                  - Detach a device token
//! POST /v1/groups/join                    - Join a group by code
//! POST /v1/notifications/group-alert      - Alert the group's honoree
//! POST /v1/hooks/groups/created           - Group-created trigger
//! POST /v1/hooks/chat/message-created     - Chat-message trigger
//! POST /v1/hooks/storage/object-finalized - Upload-finalize trigger
//! POST /v1/hooks/storage/object-deleted   - Upload-delete trigger
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiErrorBody, ApiResult};
pub use server::{router, serve};
pub use state::AppState;
