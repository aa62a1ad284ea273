use std::sync::Arc;

use tracing::info;

use super::{
    config::Config,
    database::{DocumentStore, init_store},
    error::AppError,
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let store = init_store(config.redis_url.as_deref(), &config.collection).await?;
        info!(
            backend = store.backend_tag(),
            collection = %config.collection,
            "Document store ready"
        );

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
