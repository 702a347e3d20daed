//! Route groups for the Muster API.
//!
//! Callable entry points live under `/v1`, trigger hooks under
//! `/v1/hooks`. Each module exposes a `routes()` builder merged by
//! [`crate::server::router`].

pub mod groups;
pub mod hooks;
pub mod notifications;
pub mod tokens;

mod common;

use axum::Router;

use crate::state::AppState;

/// All `/v1` routes.
pub fn v1() -> Router<AppState> {
    Router::new()
        .merge(tokens::routes())
        .merge(groups::routes())
        .merge(notifications::routes())
        .merge(hooks::routes())
}
