use std::sync::Arc;

use itemcmp_catalog::CatalogService;
use itemcmp_store::JsonFileStore;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Catalog HTTP server backed by a [`JsonFileStore`].
pub struct CatalogServer {
    config: ServerConfig,
    catalog: Arc<CatalogService>,
}

impl CatalogServer {
    /// Create a server storing records under `config.storage_dir`.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(JsonFileStore::new(&config.storage_dir));
        Self {
            catalog: Arc::new(CatalogService::new(store)),
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(Arc::clone(&self.catalog)))
    }

    /// Bind the configured address and serve until the process exits.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            storage = %self.config.storage_dir.display(),
            "itemcmp server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
