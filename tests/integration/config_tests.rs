//! Configuration loading tests

#[cfg(test)]
mod tests {
    use std::io::Write;
    use tempfile::NamedTempFile;
    use warehouse_gate::auth::rbac::{AccessLevel, Capability, Role};
    use warehouse_gate::config::{AuditSinkKind, Config};
    use warehouse_gate::server::AppState;
    use warehouse_gate::storage::{InMemoryStore, StorageLayer};

    const SECRET_LINE: &str = "  jwt_secret: \"integration-config-secret-with-32-plus-chars\"\n";

    fn write_config(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    fn load(body: &str) -> warehouse_gate::Result<Config> {
        let file = write_config(body);
        tokio_test::block_on(Config::from_file(file.path()))
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config = load(&format!("auth:\n{}", SECRET_LINE)).unwrap();

        assert_eq!(config.server().port, 8080);
        assert_eq!(
            config.rbac().global_access_roles,
            vec![Role::Admin, Role::GeneralManager, Role::OpsManager]
        );
        assert!(config.rbac().matrix.is_none());
        assert!(config.audit().enabled);
        assert_eq!(config.audit().sink, AuditSinkKind::Tracing);
        assert!(!config.storage().database.enabled);
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let err = load("server:\n  port: 9000\n").unwrap_err();
        assert!(err.to_string().contains("JWT secret"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = tokio_test::block_on(Config::from_file("/nonexistent/warehouse-gate.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_incomplete_matrix_fails_startup() {
        let body = format!(
            "auth:\n{}rbac:\n  matrix:\n    staff:\n      view_stock: granted\n",
            SECRET_LINE
        );
        let err = load(&body).unwrap_err();
        assert!(err.to_string().contains("missing entries"));
    }

    #[test]
    fn test_unknown_access_level_fails_to_parse() {
        let body = format!(
            "auth:\n{}rbac:\n  matrix:\n    staff:\n      view_stock: sometimes\n",
            SECRET_LINE
        );
        assert!(load(&body).is_err());
    }

    #[test]
    fn test_cache_ttl_cannot_outlive_tokens() {
        let body = format!(
            "auth:\n{}  jwt_expiration: 600\nrbac:\n  cache:\n    ttl_seconds: 900\n",
            SECRET_LINE
        );
        let err = load(&body).unwrap_err();
        assert!(err.to_string().contains("ttl_seconds"));
    }

    #[test]
    fn test_loaded_config_drives_authorization() {
        let body = format!(
            "auth:\n{}rbac:\n  global_access_roles: [admin]\n",
            SECRET_LINE
        );
        let config = load(&body).unwrap();
        let state = AppState::from_storage(
            config,
            StorageLayer::in_memory(std::sync::Arc::new(InMemoryStore::new())),
        )
        .unwrap();

        let rbac = state.auth.rbac();
        assert_eq!(rbac.global_access_roles().len(), 1);
        assert_eq!(
            rbac.matrix().level(Role::Staff, Capability::ViewTransactions),
            AccessLevel::OwnOnly
        );
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = load(&format!("auth:\n{}", SECRET_LINE)).unwrap();
        let yaml = config.to_yaml().unwrap();
        let reparsed = Config::parse(&yaml).unwrap();
        assert_eq!(reparsed.auth.jwt_secret, config.auth().jwt_secret);
        assert_eq!(reparsed.rbac.global_access_roles, config.rbac().global_access_roles);
    }
}
