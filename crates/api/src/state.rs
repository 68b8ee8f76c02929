//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: Catalog,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner { catalog }),
        }
    }

    /// Get a reference to the loaded catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }
}
