//! Muster API server binary.
//!
//! Local composition: the in-memory store and the no-op push transport.
//! Production deployments substitute their store and transport bindings
//! here; every component downstream takes them as injected dependencies.

use std::sync::Arc;

use anyhow::Context;

use muster_api::{serve, AppState, Config};
use muster_core::{init_logging, DocumentStore, MemoryStore};
use muster_push::{NoopTransport, PushTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_logging(config.log_format);
    muster_api::metrics::init_metrics();

    let store = Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>;
    let transport = Arc::new(NoopTransport) as Arc<dyn PushTransport>;

    let state = AppState::new(config, store, transport);
    serve(state).await.context("server failed")?;
    Ok(())
}
