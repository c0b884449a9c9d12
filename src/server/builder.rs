//! Server builder and run_server function

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::storage::StorageLayer;
use crate::utils::error::{GatewayError, Result};
use tracing::info;

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
    migrate: bool,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Run database migrations before serving
    pub fn with_migrations(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    /// Build the HTTP server
    pub async fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::config("Configuration is required"))?;

        let storage = StorageLayer::new(&config.gateway.storage).await?;
        if self.migrate {
            storage.migrate().await?;
        }
        storage.health_check().await?;

        HttpServer::with_storage(&config, storage)
    }
}

/// Build and run the server for a loaded configuration
pub async fn run_server(config: Config, migrate: bool) -> Result<()> {
    info!("Starting warehouse-gate {}", env!("CARGO_PKG_VERSION"));

    let server = ServerBuilder::new()
        .with_config(config)
        .with_migrations(migrate)
        .build()
        .await?;

    let address = server.config().address();
    info!("Server starting at: http://{}", address);
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   GET  /api/v1/authz/context - Caller authorization context");
    info!("   POST /api/v1/authz/check - Evaluate requirements");
    info!("   GET  /api/v1/admin/matrix - Permission matrix");

    server.start().await
}
