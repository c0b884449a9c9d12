//! Authorization scenarios from the warehouse floor

#[cfg(test)]
mod tests {
    use crate::common::{TestApp, TestUser};
    use warehouse_gate::auth::rbac::guards;
    use warehouse_gate::auth::rbac::{
        AccessLevel, AccessRequirement, AuthorizationContext, Capability, DenyReason, Requirement,
        Role, Warehouse,
    };

    async fn context(app: &TestApp, user: &TestUser) -> AuthorizationContext {
        user.seed(app.storage()).await;
        let resolution = app.state.auth.context_for(Some(&user.identity())).await;
        assert!(resolution.is_ok(), "{:?}", resolution.error);
        resolution.context
    }

    #[tokio::test]
    async fn test_staff_views_own_transactions_only() {
        let app = TestApp::in_memory();
        let staff = TestUser::new(&[Role::Staff]).with_warehouses(&[Warehouse::Ubb]);
        let ctx = context(&app, &staff).await;

        assert!(ctx.check(&Requirement::capability(Capability::ViewTransactions)).is_allowed());

        let decision = ctx.check(&Requirement::all_access(Capability::ViewTransactions));
        assert_eq!(
            decision.reason(),
            Some(&DenyReason::PermissionDenied {
                capability: Capability::ViewTransactions,
                required: AccessRequirement::AllAccess,
                actual: AccessLevel::OwnOnly,
            })
        );
        assert_eq!(decision.reason().map(DenyReason::http_status), Some(403));
    }

    #[tokio::test]
    async fn test_admin_reaches_every_warehouse_without_assignments() {
        let app = TestApp::in_memory();
        let admin = TestUser::new(&[Role::Admin]);
        let ctx = context(&app, &admin).await;

        for warehouse in Warehouse::ALL {
            assert!(guards::check_warehouse(&ctx, warehouse).is_allowed());
        }
        assert!(ctx.warehouses.has_global_access);
    }

    #[tokio::test]
    async fn test_edit_transactions_across_roles() {
        let app = TestApp::in_memory();

        let supervisor = context(&app, &TestUser::new(&[Role::Supervisor])).await;
        let staff = context(&app, &TestUser::new(&[Role::Staff])).await;
        let both = context(&app, &TestUser::new(&[Role::Staff, Role::Supervisor])).await;

        let edit = Requirement::capability(Capability::EditTransactions);
        assert!(supervisor.check(&edit).is_allowed());
        assert!(!staff.check(&edit).is_allowed());
        assert!(both.check(&edit).is_allowed());
    }

    #[tokio::test]
    async fn test_supervisor_confined_to_assigned_warehouses() {
        let app = TestApp::in_memory();
        let supervisor =
            TestUser::new(&[Role::Supervisor]).with_warehouses(&[Warehouse::Ubb, Warehouse::Kkb]);
        let ctx = context(&app, &supervisor).await;

        assert_eq!(ctx.warehouses.codes(), vec!["UBB", "KKB"]);
        assert!(!guards::check_warehouse(&ctx, Warehouse::Mma).is_allowed());
        assert!(!guards::check_warehouse(&ctx, Warehouse::Srg).is_allowed());
    }

    #[tokio::test]
    async fn test_ops_manager_is_manager_tier_but_not_admin() {
        let app = TestApp::in_memory();
        let ctx = context(&app, &TestUser::new(&[Role::OpsManager])).await;

        assert!(guards::manager_tier(&ctx).is_allowed());
        assert!(guards::supervisor_tier(&ctx).is_allowed());
        assert_eq!(
            guards::admin_only(&ctx).reason().map(DenyReason::code),
            Some("ROLE_DENIED")
        );
        assert!(!ctx.can(Capability::ManageUsers));
    }

    #[tokio::test]
    async fn test_outage_denies_every_guard() {
        let app = TestApp::in_memory();
        let admin = TestUser::new(&[Role::Admin]);
        admin.seed(app.storage()).await;
        app.memory.as_ref().unwrap().set_unavailable(true);

        let resolution = app.state.auth.context_for(Some(&admin.identity())).await;
        assert!(!resolution.is_ok());

        let ctx = resolution.context;
        assert!(ctx.is_degraded());
        for decision in [
            guards::admin_only(&ctx),
            guards::check_warehouse(&ctx, Warehouse::Ubb),
            guards::check_capability(&ctx, Capability::ViewDashboard, AccessRequirement::Basic),
        ] {
            assert_eq!(decision.reason(), Some(&DenyReason::DatastoreUnavailable));
        }
    }
}
