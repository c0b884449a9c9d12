//! HTTP API tests through the actix test service

#[cfg(test)]
mod tests {
    use crate::common::{TestApp, TestDatabase, TestUser};
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use serde_json::{Value, json};
    use std::time::Duration;
    use warehouse_gate::auth::rbac::{AccessLevel, Capability, PermissionSnapshot, Role, Warehouse};
    use warehouse_gate::server::HttpServer;
    use warehouse_gate::storage::AuditStore;

    macro_rules! service {
        ($app:expr) => {
            test::init_service(HttpServer::create_app(web::Data::new($app.state.clone()))).await
        };
    }

    #[actix_web::test]
    async fn test_health_and_version_are_public() {
        let app = TestApp::in_memory();
        let service = service!(app);

        let res = test::call_service(&service, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));

        let body: Value = test::call_and_read_body_json(
            &service,
            test::TestRequest::get().uri("/version").to_request(),
        )
        .await;
        assert_eq!(body["data"]["name"], "warehouse-gate");
    }

    #[actix_web::test]
    async fn test_health_over_database() {
        let db = TestDatabase::new().await;
        let app = TestApp::with_storage(db.storage());
        let service = service!(app);

        let body: Value = test::call_and_read_body_json(
            &service,
            test::TestRequest::get().uri("/health").to_request(),
        )
        .await;
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["storage"], true);
    }

    #[actix_web::test]
    async fn test_context_requires_authentication() {
        let app = TestApp::in_memory();
        let service = service!(app);

        let res = test::call_service(
            &service,
            test::TestRequest::get().uri("/api/v1/authz/context").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["error"]["code"], "AUTHENTICATION_REQUIRED");
    }

    #[actix_web::test]
    async fn test_context_for_authenticated_user() {
        let app = TestApp::in_memory();
        let staff = TestUser::new(&[Role::Staff]).with_warehouses(&[Warehouse::Srg]);
        staff.seed(app.storage()).await;
        let service = service!(app);

        let req = test::TestRequest::get()
            .uri("/api/v1/authz/context")
            .insert_header(app.bearer(&staff))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        let data = &body["data"];
        assert_eq!(data["user_id"], staff.id.to_string());
        assert_eq!(data["roles"], json!(["staff"]));
        assert_eq!(data["permissions"]["view_transactions"], "own_only");
        assert_eq!(data["permissions"]["edit_transactions"], "denied");
        assert_eq!(data["warehouses"], json!(["SRG"]));
        assert_eq!(data["has_global_access"], false);
        assert_eq!(data["source"], "merged");
    }

    #[actix_web::test]
    async fn test_check_endpoint_reports_decisions() {
        let app = TestApp::in_memory();
        let staff = TestUser::new(&[Role::Staff]).with_warehouses(&[Warehouse::Ubb]);
        staff.seed(app.storage()).await;
        let service = service!(app);

        let req = test::TestRequest::post()
            .uri("/api/v1/authz/check")
            .insert_header(app.bearer(&staff))
            .set_json(json!({
                "kind": "capability",
                "capability": "view_transactions",
                "level": "all_access"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["allowed"], false);
        assert_eq!(body["data"]["http_status"], 403);
        assert_eq!(body["data"]["reason"]["code"], "PERMISSION_DENIED");

        let req = test::TestRequest::post()
            .uri("/api/v1/authz/check")
            .insert_header(app.bearer(&staff))
            .set_json(json!({
                "requirements": [
                    { "kind": "capability", "capability": "view_stock" },
                    { "kind": "warehouse", "warehouse": "UBB" }
                ]
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["allowed"], true);
    }

    #[actix_web::test]
    async fn test_refresh_rebuilds_cached_context() {
        let app = TestApp::in_memory();
        let staff = TestUser::new(&[Role::Staff]);
        staff.seed(app.storage()).await;
        let service = service!(app);

        let context = || {
            test::TestRequest::get()
                .uri("/api/v1/authz/context")
                .insert_header(app.bearer(&staff))
                .to_request()
        };
        let body: Value = test::call_and_read_body_json(&service, context()).await;
        assert_eq!(body["data"]["source"], "merged");

        // Written behind the cache's back
        let mut snapshot = PermissionSnapshot::new();
        snapshot.insert(Capability::ViewReports, AccessLevel::Granted);
        app.storage()
            .assignments
            .set_permission_snapshot(staff.id, Some(snapshot))
            .await
            .unwrap();

        let body: Value = test::call_and_read_body_json(&service, context()).await;
        assert_eq!(body["data"]["source"], "merged");

        let req = test::TestRequest::post()
            .uri("/api/v1/authz/refresh")
            .insert_header(app.bearer(&staff))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["source"], "snapshot");
        assert_eq!(body["data"]["permissions"], json!({ "view_reports": "granted" }));

        let res = test::call_service(
            &service,
            test::TestRequest::post().uri("/api/v1/authz/refresh").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_admin_routes_enforce_roles_and_audit() {
        let app = TestApp::in_memory();
        let supervisor = TestUser::new(&[Role::Supervisor]);
        supervisor.seed(app.storage()).await;
        let service = service!(app);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/matrix")
            .insert_header(app.bearer(&supervisor))
            .insert_header(("x-request-id", "req-matrix-1"))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(res.headers().get("x-request-id").unwrap(), "req-matrix-1");

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["error"]["code"], "ROLE_DENIED");
        assert!(body["error"]["timestamp"].is_i64());
        assert_eq!(body["error"]["request_id"], "req-matrix-1");
        assert_eq!(body["error"]["details"]["required"], json!(["admin"]));

        let memory = app.memory.as_ref().unwrap();
        for _ in 0..50 {
            if memory.denial_count() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(memory.denial_count(), 1);

        let recorded = memory.recent_denials(1).await.unwrap().remove(0);
        assert_eq!(recorded.user_id, Some(supervisor.id));
        assert_eq!(recorded.client.request_id.as_deref(), Some("req-matrix-1"));
    }

    #[actix_web::test]
    async fn test_admin_reads_matrix_and_policies() {
        let app = TestApp::in_memory();
        let admin = TestUser::new(&[Role::Admin]);
        admin.seed(app.storage()).await;
        let service = service!(app);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/matrix")
            .insert_header(app.bearer(&admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["matrix"]["grants"]["staff"]["view_transactions"], "own_only");
        assert_eq!(
            body["data"]["global_access_roles"],
            json!(["admin", "general_manager", "ops_manager"])
        );

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/policies")
            .insert_header(app.bearer(&admin))
            .to_request();
        let sql = test::call_and_read_body(&service, req).await;
        let sql = String::from_utf8(sql.to_vec()).unwrap();
        assert!(sql.contains("CREATE POLICY transactions_authz ON transactions"));
    }

    #[actix_web::test]
    async fn test_assignment_change_takes_effect_immediately() {
        let app = TestApp::in_memory();
        let admin = TestUser::new(&[Role::Admin]);
        let staff = TestUser::new(&[Role::Staff]);
        admin.seed(app.storage()).await;
        staff.seed(app.storage()).await;
        let service = service!(app);

        let edit_check = || {
            test::TestRequest::post()
                .uri("/api/v1/authz/check")
                .insert_header(app.bearer(&staff))
                .set_json(json!({ "kind": "capability", "capability": "edit_transactions" }))
                .to_request()
        };

        // Prime the staff member's cached context
        let body: Value = test::call_and_read_body_json(&service, edit_check()).await;
        assert_eq!(body["data"]["allowed"], false);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/admin/users/{}/roles/supervisor", staff.id))
            .insert_header(app.bearer(&admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["changed"], true);

        let body: Value = test::call_and_read_body_json(&service, edit_check()).await;
        assert_eq!(body["data"]["allowed"], true);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/admin/users/{}/roles/supervisor", staff.id))
            .insert_header(app.bearer(&admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["changed"], true);

        let body: Value = test::call_and_read_body_json(&service, edit_check()).await;
        assert_eq!(body["data"]["allowed"], false);
    }

    #[actix_web::test]
    async fn test_warehouse_assignment_and_bad_codes() {
        let app = TestApp::in_memory();
        let admin = TestUser::new(&[Role::Admin]);
        let staff = TestUser::new(&[Role::Staff]);
        admin.seed(app.storage()).await;
        let service = service!(app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/admin/users/{}/warehouses/kkb", staff.id))
            .insert_header(app.bearer(&admin))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/admin/users/{}/warehouses/XYZ", staff.id))
            .insert_header(app.bearer(&admin))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/admin/users/{}/roles/owner", staff.id))
            .insert_header(app.bearer(&admin))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let ctx = app.state.auth.context_for(Some(&staff.identity())).await.context;
        assert_eq!(ctx.warehouses.codes(), vec!["KKB"]);
    }

    #[actix_web::test]
    async fn test_audit_listing_requires_system_settings() {
        let app = TestApp::in_memory();
        let admin = TestUser::new(&[Role::Admin]);
        let manager = TestUser::new(&[Role::GeneralManager]);
        admin.seed(app.storage()).await;
        manager.seed(app.storage()).await;
        let service = service!(app);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/audit?limit=10")
            .insert_header(app.bearer(&manager))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let memory = app.memory.as_ref().unwrap();
        for _ in 0..50 {
            if memory.denial_count() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/audit?limit=10")
            .insert_header(app.bearer(&admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["meta"]["count"], 1);
        assert_eq!(body["data"][0]["user_id"], manager.id.to_string());
        assert_eq!(body["data"][0]["reason_code"], "PERMISSION_DENIED");

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/audit?limit=0")
            .insert_header(app.bearer(&admin))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_datastore_outage_returns_503() {
        let app = TestApp::in_memory();
        let admin = TestUser::new(&[Role::Admin]);
        admin.seed(app.storage()).await;
        app.memory.as_ref().unwrap().set_unavailable(true);
        let service = service!(app);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/matrix")
            .insert_header(app.bearer(&admin))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["error"]["code"], "DATASTORE_UNAVAILABLE");

        let res =
            test::call_service(&service, test::TestRequest::get().uri("/health").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["status"], "degraded");
        assert_eq!(body["data"]["storage"], false);

        app.memory.as_ref().unwrap().set_unavailable(false);
        let res =
            test::call_service(&service, test::TestRequest::get().uri("/health").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
