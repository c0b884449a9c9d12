//! Test fixtures and factories

use std::sync::Arc;
use uuid::Uuid;
use warehouse_gate::auth::Identity;
use warehouse_gate::auth::rbac::{Role, Warehouse};
use warehouse_gate::config::{AuditSinkKind, AuthConfig, Config};
use warehouse_gate::server::AppState;
use warehouse_gate::storage::{InMemoryStore, StorageLayer};

/// Signing secret shared by every test token
pub const TEST_SECRET: &str = "integration-test-secret-with-at-least-32-chars";

/// A user with a fixed set of roles and warehouse assignments
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub roles: Vec<Role>,
    pub warehouses: Vec<Warehouse>,
}

impl TestUser {
    pub fn new(roles: &[Role]) -> Self {
        Self {
            id: Uuid::new_v4(),
            roles: roles.to_vec(),
            warehouses: Vec::new(),
        }
    }

    pub fn with_warehouses(mut self, warehouses: &[Warehouse]) -> Self {
        self.warehouses = warehouses.to_vec();
        self
    }

    pub fn identity(&self) -> Identity {
        Identity::with_session(self.id, format!("session-{}", self.id))
    }

    /// Write the user's assignments to storage
    pub async fn seed(&self, storage: &StorageLayer) {
        for role in &self.roles {
            storage
                .assignments
                .assign_role(self.id, *role)
                .await
                .expect("Failed to seed role");
        }
        for warehouse in &self.warehouses {
            storage
                .assignments
                .assign_warehouse(self.id, *warehouse)
                .await
                .expect("Failed to seed warehouse");
        }
    }
}

/// Configuration accepted by validation, with audit records persisted
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.gateway.auth = AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..Default::default()
    };
    config.gateway.audit.sink = AuditSinkKind::Both;
    config
}

/// Application state plus handles tests poke at directly
pub struct TestApp {
    pub state: AppState,
    pub memory: Option<Arc<InMemoryStore>>,
}

impl TestApp {
    /// App state over an in-memory store
    pub fn in_memory() -> Self {
        let memory = Arc::new(InMemoryStore::new());
        let storage = StorageLayer::in_memory(Arc::clone(&memory));
        let state = AppState::from_storage(test_config(), storage).expect("Failed to build state");
        Self {
            state,
            memory: Some(memory),
        }
    }

    /// App state over an arbitrary storage layer
    pub fn with_storage(storage: StorageLayer) -> Self {
        let state = AppState::from_storage(test_config(), storage).expect("Failed to build state");
        Self {
            state,
            memory: None,
        }
    }

    pub fn storage(&self) -> &StorageLayer {
        &self.state.storage
    }

    /// Signed bearer token for a user
    pub fn token_for(&self, user: &TestUser) -> String {
        self.state
            .auth
            .jwt()
            .issue(&user.identity())
            .expect("Failed to issue token")
    }

    /// `Authorization` header value for a user
    pub fn bearer(&self, user: &TestUser) -> (&'static str, String) {
        ("authorization", format!("Bearer {}", self.token_for(user)))
    }
}
