use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{CatalogOptions, Config, OrderContact};
use crate::services::catalog::CatalogService;
use crate::services::file_store::FileStore;
use crate::storage::connect_store;

/// Shared handler state, built once at startup.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    catalog: CatalogService,
    contact: Arc<OrderContact>,
}

impl AppState {
    pub fn new(config: &Config, db: DatabaseConnection, files: FileStore) -> Self {
        let store = connect_store(config.storage_backend, db.clone());
        let options: Arc<CatalogOptions> = Arc::new(config.catalog.clone());
        Self {
            db,
            catalog: CatalogService::new(store, files, options),
            contact: Arc::new(config.contact.clone()),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn contact(&self) -> &OrderContact {
        &self.contact
    }
}
