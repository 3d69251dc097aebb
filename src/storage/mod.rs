//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::InMemoryOrderStore;
#[cfg(feature = "mongodb_backend")]
pub use mongodb::MongoOrderStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::core::store::OrderStore;
use std::sync::Arc;

/// Open the backend selected by `storage.backend`
pub async fn connect(config: &StorageConfig) -> anyhow::Result<Arc<dyn OrderStore>> {
    match config.backend {
        StorageBackend::InMemory => {
            tracing::warn!("using in-memory order storage; orders are lost on restart");
            Ok(Arc::new(InMemoryOrderStore::new()))
        }
        #[cfg(feature = "mongodb_backend")]
        StorageBackend::Mongodb => {
            let store = MongoOrderStore::connect(&config.uri, &config.database).await?;
            tracing::info!(database = %config.database, "connected to MongoDB");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb_backend"))]
        StorageBackend::Mongodb => Err(anyhow::anyhow!(
            "storage.backend is 'mongodb' but the crate was built without the mongodb_backend feature"
        )),
    }
}
