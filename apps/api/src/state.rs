//! Shared handler state.

use shelf_db::{CatalogService, Database};

/// Cloned into every handler by axum.
#[derive(Debug, Clone)]
pub struct AppState {
    catalog: CatalogService,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        AppState { catalog }
    }

    /// Builds the state over an open database.
    pub fn from_database(db: Database) -> Self {
        AppState::new(CatalogService::new(db))
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }
}
