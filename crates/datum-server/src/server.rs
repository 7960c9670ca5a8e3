use std::sync::Arc;

use datum_backend::{Backend, DiskBlobStore};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// datum HTTP server.
pub struct DatumServer {
    config: ServerConfig,
    backend: Arc<Backend>,
}

impl DatumServer {
    /// Server over a disk store rooted at `config.data_dir`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = DiskBlobStore::open(&config.data_dir)
            .map_err(|e| ServerError::Config(format!("{}: {e}", config.data_dir.display())))?;
        let backend = Backend::with_config(Arc::new(store), config.backend.clone());
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: ServerConfig, backend: Arc<Backend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.backend), self.config.max_body_bytes)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!(
            addr = %self.config.bind_addr,
            data_dir = %self.config.data_dir.display(),
            "datum server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
