use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::ImageStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: catalog_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Local storage for uploaded product and category images.
    pub images: Arc<ImageStore>,
}

impl AppState {
    pub fn new(pool: catalog_db::DbPool, config: ServerConfig) -> Self {
        let images = ImageStore::new(config.upload_root.clone(), config.image_policy());
        Self {
            pool,
            config: Arc::new(config),
            images: Arc::new(images),
        }
    }
}
