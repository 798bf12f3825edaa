//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. The registry is immutable for the life of the
//! process, so it is shared behind an `Arc` without a lock.

use std::sync::Arc;

use depot_core::Registry;
use depot_store::ArtifactStore;

/// State shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Containers, users, and the anonymous scope.
    pub registry: Arc<Registry>,
    /// Filesystem access.
    pub store: ArtifactStore,
}

impl AppState {
    /// Wrap a registry with the default store.
    pub fn new(registry: Registry) -> Self {
        Self::with_store(registry, ArtifactStore::new())
    }

    /// Wrap a registry with an explicitly configured store.
    pub fn with_store(registry: Registry, store: ArtifactStore) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
        }
    }
}
