//! Generated storage-level policy tests

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use warehouse_gate::auth::rbac::{AccessLevel, Capability, PermissionMatrix, RbacSystem, Role};
    use warehouse_gate::config::{ProtectedTable, RbacConfig};
    use warehouse_gate::storage::InMemoryStore;

    fn render(config: &RbacConfig) -> String {
        RbacSystem::new(config, Arc::new(InMemoryStore::new()))
            .unwrap()
            .policy_set()
            .unwrap()
            .render()
    }

    fn standard_grants() -> BTreeMap<Role, BTreeMap<Capability, AccessLevel>> {
        let mut grants: BTreeMap<Role, BTreeMap<Capability, AccessLevel>> = BTreeMap::new();
        for (role, capability, level) in PermissionMatrix::standard().entries() {
            grants.entry(role).or_default().insert(capability, level);
        }
        grants
    }

    #[test]
    fn test_every_matrix_entry_is_seeded() {
        let sql = render(&RbacConfig::default());

        for (role, capability, level) in PermissionMatrix::standard().entries() {
            let row = format!(
                "('{}', '{}', '{}', {})",
                role,
                capability,
                level,
                level.precedence()
            );
            assert!(sql.contains(&row), "missing seed row {}", row);
        }
    }

    #[test]
    fn test_policies_follow_configured_matrix() {
        let mut grants = standard_grants();
        grants
            .get_mut(&Role::Staff)
            .unwrap()
            .insert(Capability::ViewTransactions, AccessLevel::AllAccess);

        let config = RbacConfig {
            matrix: Some(grants),
            global_access_roles: vec![Role::Admin],
            ..Default::default()
        };
        let sql = render(&config);

        assert!(sql.contains("('staff', 'view_transactions', 'all_access', 3)"));
        assert!(!sql.contains("('staff', 'view_transactions', 'own_only', 2)"));
        assert!(sql.contains("INSERT INTO global_access_roles (role) VALUES ('admin');"));
    }

    #[test]
    fn test_configured_tables_get_policies() {
        let mut config = RbacConfig::default();
        config.policy.protected_tables = vec![
            ProtectedTable::new("cycle_counts", Capability::ViewStock),
            ProtectedTable::new("pick_lists", Capability::ViewTransactions).with_owner("assigned_to"),
        ];
        let sql = render(&config);

        assert!(sql.contains("CREATE POLICY cycle_counts_authz ON cycle_counts"));
        assert!(sql.contains("authz_effective_precedence(auth.uid(), 'view_stock') > 0"));
        assert!(sql.contains("CREATE POLICY pick_lists_authz ON pick_lists"));
        assert!(sql.contains("= 2 AND assigned_to = auth.uid()"));
        assert!(!sql.contains("CREATE POLICY stock_authz"));
    }

    #[test]
    fn test_custom_user_expression() {
        let mut config = RbacConfig::default();
        config.policy.user_expression = "current_setting('app.user_id')::uuid".to_string();
        let sql = render(&config);

        assert!(sql.contains(
            "authz_can_access_warehouse(current_setting('app.user_id')::uuid, warehouse_code)"
        ));
        assert!(!sql.contains("auth.uid()"));
    }
}
