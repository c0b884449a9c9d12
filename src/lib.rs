//! # warehouse-gate
//!
//! Authorization core for a multi-warehouse inventory system.
//!
//! Users hold one or more roles; each role maps every capability to an
//! access level. A user's effective permissions are the per-capability
//! maximum over their roles, and their warehouse visibility is either
//! global (through a global-access role) or exactly their assigned set.
//! Guards evaluate requirements against the resulting context and deny
//! by default when anything is missing or unreadable.
//!
//! ## Embedded use
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use warehouse_gate::auth::rbac::{Capability, RbacSystem, Requirement};
//! use warehouse_gate::auth::Identity;
//! use warehouse_gate::config::RbacConfig;
//! use warehouse_gate::storage::InMemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rbac = RbacSystem::new(&RbacConfig::default(), Arc::new(InMemoryStore::new()))?;
//!     let identity = Identity::new(uuid::Uuid::new_v4());
//!
//!     let ctx = rbac.context_for(Some(&identity)).await.context;
//!     let decision = ctx.check(&Requirement::capability(Capability::ViewStock));
//!     println!("allowed: {}", decision.is_allowed());
//!     Ok(())
//! }
//! ```
//!
//! ## Gateway mode
//!
//! ```rust,no_run
//! use warehouse_gate::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/warehouse-gate.yaml").await?;
//!     let gateway = Gateway::new(config).await?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use auth::rbac::{
    AccessLevel, AuthorizationContext, Capability, Decision, DenyReason, Requirement, Role,
    Warehouse,
};
pub use auth::{AuthSystem, Identity};
pub use config::Config;
pub use utils::error::{GatewayError, Result};

use tracing::info;

/// Gateway: HTTP server over the authorization core
pub struct Gateway {
    config: Config,
    server: server::HttpServer,
}

impl Gateway {
    /// Create a new gateway instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating new gateway instance");

        let server = server::HttpServer::new(&config).await?;

        Ok(Self { config, server })
    }

    /// Run the gateway server
    pub async fn run(self) -> Result<()> {
        info!("Starting warehouse-gate on {}", self.config.server().address());
        self.server.start().await
    }
}

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Gateway build information
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    /// Crate name
    pub name: &'static str,
    /// Version number
    pub version: &'static str,
    /// Build timestamp (unix seconds)
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

/// Build information captured at compile time
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
