//! Shared application state.

use std::sync::Arc;

use crate::backend::SharedBackend;
use crate::config::StorefrontConfig;
use crate::stores::{ProductStore, UserStore};

/// Application state shared across all request handlers.
///
/// Cheap to clone; all fields live behind a single `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: SharedBackend,
    products: ProductStore,
    users: UserStore,
}

impl AppState {
    /// Build the state for a given backend.
    #[must_use]
    pub fn new(config: StorefrontConfig, backend: SharedBackend) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                products: ProductStore::new(backend.clone()),
                users: UserStore::new(backend.clone()),
                config,
                backend,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &SharedBackend {
        &self.inner.backend
    }

    #[must_use]
    pub fn products(&self) -> &ProductStore {
        &self.inner.products
    }

    #[must_use]
    pub fn users(&self) -> &UserStore {
        &self.inner.users
    }
}
