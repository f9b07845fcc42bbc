//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogError};
use crate::config::StorefrontConfig;
use crate::search::{self, SearchIndex};
use crate::services::auth::AccountDirectory;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// process-wide resources: the catalog, accounts, and the search index.
/// Carts and wishlists are not here; they belong to each session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    accounts: AccountDirectory,
    search: SearchIndex,
}

impl AppState {
    /// Create a new application state around an existing catalog.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                accounts: AccountDirectory::new(),
                search: SearchIndex::new(),
            }),
        }
    }

    /// Create application state, seeding the catalog from the configured file.
    ///
    /// A configured path that doesn't exist yields an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the seed file exists but can't be loaded.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog_path {
            Some(path) if path.exists() => Catalog::load(path)?,
            Some(path) => {
                tracing::warn!(path = %path.display(), "Catalog file not found, starting empty");
                Catalog::new()
            }
            None => Catalog::new(),
        };

        Ok(Self::new(config, catalog))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the listing catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the account directory.
    #[must_use]
    pub fn accounts(&self) -> &AccountDirectory {
        &self.inner.accounts
    }

    /// Get a reference to the search index.
    #[must_use]
    pub fn search(&self) -> &SearchIndex {
        &self.inner.search
    }

    /// Rebuild the search index from the catalog in the background.
    ///
    /// Called at startup and after each new listing.
    pub fn start_search_indexing(&self) {
        search::build_index_async(self.inner.search.clone(), self.inner.catalog.clone());
    }
}
