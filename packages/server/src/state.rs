use std::sync::Arc;

use common::storage::{ObjectStore, StorageBackend, StorageError, memory::MemoryObjectStore};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub store: Arc<dyn ObjectStore>,
    pub config: AppConfig,
}

/// Construct the object store backend named by the configuration.
pub fn build_object_store(config: &AppConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.storage.backend {
        StorageBackend::S3 => {
            let store = common::storage::s3::S3ObjectStore::from_config(&config.storage)?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => Ok(Arc::new(MemoryObjectStore::new())),
    }
}
