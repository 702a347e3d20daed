//! Shared application state.

use std::sync::Arc;

use muster_core::DocumentStore;
use muster_groups::{GroupDirectory, StatsProvisioner, StorageLedger};
use muster_push::{
    NotificationDispatcher, NotificationFanout, PushTransport, RecipientResolver, TokenRegistry,
};

use crate::config::Config;

/// Shared state for all request handlers.
///
/// This is a thin composition layer: every field is a domain service
/// constructed over the injected store and transport. No domain policy
/// lives here.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Token ownership bookkeeping.
    pub registry: TokenRegistry,
    /// Notification fan-out (resolution + dispatch).
    pub fanout: NotificationFanout,
    /// Join-code resolution and membership adds.
    pub directory: GroupDirectory,
    /// Per-group storage byte accounting.
    pub ledger: StorageLedger,
    /// Group stats seeding on creation.
    pub provisioner: StatsProvisioner,
}

impl AppState {
    /// Wires the domain services over the given store and transport.
    #[must_use]
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        let registry = TokenRegistry::with_in_query_limit(Arc::clone(&store), config.in_query_limit);
        let resolver =
            RecipientResolver::with_in_query_limit(Arc::clone(&store), config.in_query_limit);
        let dispatcher = NotificationDispatcher::new(transport, registry.clone());
        let fanout = NotificationFanout::new(resolver, dispatcher);

        Self {
            registry,
            fanout,
            directory: GroupDirectory::new(Arc::clone(&store)),
            ledger: StorageLedger::new(Arc::clone(&store)),
            provisioner: StatsProvisioner::new(store),
            config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
