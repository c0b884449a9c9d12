//! Test database utilities
//!
//! Provides in-memory SQLite databases for testing without external
//! dependencies. Each test gets an isolated, migrated instance.

use std::sync::Arc;
use warehouse_gate::config::DatabaseConfig;
use warehouse_gate::storage::StorageLayer;
use warehouse_gate::storage::database::Database;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<Database>,
}

impl TestDatabase {
    /// Create a new migrated in-memory database
    pub async fn new() -> Self {
        let db = Database::new(&test_db_config())
            .await
            .expect("Failed to create in-memory test database");

        db.migrate()
            .await
            .expect("Failed to run database migrations");

        Self {
            inner: Arc::new(db),
        }
    }

    /// Get reference to the underlying database
    pub fn db(&self) -> &Database {
        &self.inner
    }

    /// Get Arc to the underlying database
    pub fn db_arc(&self) -> Arc<Database> {
        Arc::clone(&self.inner)
    }

    /// Storage layer backed by this database
    pub fn storage(&self) -> StorageLayer {
        StorageLayer::from_database(self.db_arc())
    }
}

/// In-memory SQLite supports a single connection per database
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
        enabled: true,
    }
}
