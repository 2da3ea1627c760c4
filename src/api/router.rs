use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::admin;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware, security_headers_middleware};
use super::portal;
use super::state::AppState;
use super::v1;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Self-service portal
        .merge(portal::create_portal_router())
        // Admin console
        .nest("/admin", admin::create_admin_router())
        // Metered inference boundary
        .nest("/v1", v1::create_v1_router())
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, HeaderMap, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::PortalConfig;
    use crate::domain::audit::{AuditAction, AuditQuery};
    use crate::infrastructure::storage::Repositories;
    use crate::infrastructure::vault::InMemoryVault;

    struct TestApp {
        router: Router,
        state: AppState,
    }

    struct Caller {
        entra_id: &'static str,
        email: &'static str,
        roles: &'static str,
    }

    const ALICE: Caller = Caller {
        entra_id: "sub-alice",
        email: "alice@example.com",
        roles: "",
    };
    const BOB: Caller = Caller {
        entra_id: "sub-bob",
        email: "bob@example.com",
        roles: "",
    };
    const ADMIN: Caller = Caller {
        entra_id: "sub-admin",
        email: "admin@example.com",
        roles: "admin",
    };

    fn app(portal: PortalConfig) -> TestApp {
        let state = AppState::new(
            Repositories::in_memory(),
            Arc::new(InMemoryVault::new()),
            portal,
        );
        TestApp {
            router: create_router(state.clone()),
            state,
        }
    }

    fn user_request(method: Method, uri: &str, caller: &Caller, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-entra-id", caller.entra_id)
            .header("x-user-email", caller.email);

        if !caller.roles.is_empty() {
            builder = builder.header("x-user-roles", caller.roles);
        }

        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn echo_request(key_identifier: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/v1/echo")
            .header("x-api-key", key_identifier)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, headers, body)
    }

    async fn issue(app: &TestApp, caller: &Caller, description: &str) -> Value {
        let (status, _, body) = send(
            app,
            user_request(
                Method::POST,
                "/keys",
                caller,
                Some(json!({ "usageDescription": description })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn count_audit(app: &TestApp, action: AuditAction) -> usize {
        app.state
            .audit
            .query(&AuditQuery::new().with_action(action))
            .await
            .unwrap()
            .total
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let app = app(PortalConfig::default());

        let (status, _, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _, body) = send(&app, Request::get("/ready").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "storage");
        assert_eq!(body["checks"][1]["message"], "memory");
    }

    #[tokio::test]
    async fn test_portal_requires_identity() {
        let app = app(PortalConfig::default());

        let request = Request::post("/keys")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"usageDescription":"x"}"#))
            .unwrap();
        let (status, _, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn test_issue_reveals_secret_once() {
        let app = app(PortalConfig::default());

        let (status, headers, body) = send(
            &app,
            user_request(
                Method::POST,
                "/keys",
                &ALICE,
                Some(json!({ "usageDescription": "  nightly batch  " })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(body["usageDescription"], "nightly batch");
        assert_eq!(body["shownOnce"], true);

        let secret = body["secret"].as_str().unwrap().to_string();
        assert!(!secret.is_empty());

        let (status, _, listed) = send(&app, user_request(Method::GET, "/keys", &ALICE, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert!(listed[0].get("secret").is_none());
        assert!(!listed.to_string().contains(&secret));

        let key_uri = format!("/keys/{}", body["id"].as_str().unwrap());
        let (_, _, single) = send(&app, user_request(Method::GET, &key_uri, &ALICE, None)).await;
        assert!(!single.to_string().contains(&secret));

        assert_eq!(count_audit(&app, AuditAction::CreateKey).await, 1);
    }

    #[tokio::test]
    async fn test_issue_validation_error_names_field() {
        let app = app(PortalConfig::default());

        let (status, _, body) = send(
            &app,
            user_request(
                Method::POST,
                "/keys",
                &ALICE,
                Some(json!({ "usageDescription": "   " })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "usageDescription");
        assert_eq!(count_audit(&app, AuditAction::CreateKey).await, 0);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let app = app(PortalConfig::default());
        let key = issue(&app, &ALICE, "ci pipeline").await;
        let uri = format!("/keys/{}/revoke", key["id"].as_str().unwrap());

        let (status, _, first) = send(&app, user_request(Method::POST, &uri, &ALICE, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["alreadyRevoked"], false);
        assert_eq!(first["apiKey"]["status"], "revoked");

        let (status, _, second) = send(&app, user_request(Method::POST, &uri, &ALICE, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["alreadyRevoked"], true);
        assert_eq!(second["apiKey"]["revokedAt"], first["apiKey"]["revokedAt"]);

        assert_eq!(count_audit(&app, AuditAction::RevokeKey).await, 1);
    }

    #[tokio::test]
    async fn test_foreign_key_looks_missing() {
        let app = app(PortalConfig::default());
        let key = issue(&app, &ALICE, "ci pipeline").await;
        let key_id = key["id"].as_str().unwrap();

        let (status, _, foreign) = send(
            &app,
            user_request(Method::POST, &format!("/keys/{}/revoke", key_id), &BOB, None),
        )
        .await;
        let (_, _, missing) = send(
            &app,
            user_request(
                Method::POST,
                &format!("/keys/{}/revoke", uuid::Uuid::new_v4()),
                &BOB,
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(foreign, missing);
        assert_eq!(count_audit(&app, AuditAction::RevokeKey).await, 0);

        let (_, _, listed) = send(&app, user_request(Method::GET, "/keys", &ALICE, None)).await;
        assert_eq!(listed[0]["status"], "active");
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin_role() {
        let app = app(PortalConfig::default());

        let (status, _, _) = send(&app, user_request(Method::GET, "/admin/users", &ALICE, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, body) = send(&app, user_request(Method::GET, "/admin/users", &ADMIN, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
    }

    #[tokio::test]
    async fn test_admin_email_grants_admin() {
        let app = app(PortalConfig {
            admin_emails: vec!["Bob@Example.com".to_string()],
            ..Default::default()
        });

        let (status, _, _) = send(&app, user_request(Method::GET, "/admin/keys", &BOB, None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_deactivated_user_is_locked_out() {
        let app = app(PortalConfig::default());
        let (_, _, alice) = send(&app, user_request(Method::POST, "/login", &ALICE, None)).await;
        let uri = format!("/admin/users/{}/deactivate", alice["id"].as_str().unwrap());

        let (status, _, body) = send(&app, user_request(Method::POST, &uri, &ADMIN, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isActive"], false);

        let (status, _, _) = send(
            &app,
            user_request(
                Method::POST,
                "/keys",
                &ALICE,
                Some(json!({ "usageDescription": "after lockout" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        assert_eq!(count_audit(&app, AuditAction::Login).await, 1);
        assert_eq!(count_audit(&app, AuditAction::UserDeactivate).await, 1);
    }

    #[tokio::test]
    async fn test_admin_revoke_and_audit_listing() {
        let app = app(PortalConfig::default());
        let key = issue(&app, &ALICE, "ci pipeline").await;
        let uri = format!("/admin/keys/{}/revoke", key["id"].as_str().unwrap());

        let (status, _, body) = send(&app, user_request(Method::POST, &uri, &ADMIN, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["alreadyRevoked"], false);

        let (status, _, logs) = send(
            &app,
            user_request(
                Method::GET,
                "/admin/audit-logs?action=REVOKE_KEY&actorEmail=admin",
                &ADMIN,
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logs["total"], 1);
        assert_eq!(logs["items"][0]["action"], "REVOKE_KEY");
        assert_eq!(logs["items"][0]["actorEmail"], "admin@example.com");
        assert_eq!(logs["items"][0]["metadata"]["adminActor"], "admin@example.com");
    }

    #[tokio::test]
    async fn test_registration_round_trip() {
        let app = app(PortalConfig::default());

        let (status, _, body) = send(
            &app,
            user_request(
                Method::POST,
                "/register",
                &ALICE,
                Some(json!({ "purpose": "internal_tooling", "projectName": "  Atlas  ", "contactEmail": "" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["projectName"], "Atlas");
        assert!(body["contactEmail"].is_null());

        let (status, _, body) = send(
            &app,
            user_request(
                Method::POST,
                "/register",
                &ALICE,
                Some(json!({ "purpose": "world_domination" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "purpose");

        let (_, _, listed) =
            send(&app, user_request(Method::GET, "/admin/registrations", &ADMIN, None)).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(count_audit(&app, AuditAction::Registration).await, 1);
    }

    #[tokio::test]
    async fn test_echo_enforces_monthly_cap() {
        let app = app(PortalConfig {
            default_monthly_cap_tokens: Some(100),
            ..Default::default()
        });
        let key = issue(&app, &ALICE, "capped").await;
        let identifier = key["keyIdentifier"].as_str().unwrap();

        let (status, _, body) =
            send(&app, echo_request(identifier, json!({ "prompt": "hi", "tokensUsed": 60 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completion"], "hi");

        let (status, _, _) =
            send(&app, echo_request(identifier, json!({ "prompt": "hi", "tokensUsed": 50 }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, body) =
            send(&app, echo_request(identifier, json!({ "prompt": "hi" }))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "monthly_token_cap_reached");

        let usage_uri = format!("/admin/keys/{}/usage", key["id"].as_str().unwrap());
        let (_, _, usage) = send(&app, user_request(Method::GET, &usage_uri, &ADMIN, None)).await;
        assert_eq!(usage["tokensUsed"], 110);
        assert_eq!(usage["tokensRemaining"], 0);
    }

    #[tokio::test]
    async fn test_echo_counts_words_when_unreported() {
        let app = app(PortalConfig::default());
        let key = issue(&app, &ALICE, "uncapped").await;

        let (status, _, body) = send(
            &app,
            echo_request(
                key["keyIdentifier"].as_str().unwrap(),
                json!({ "prompt": "three little words" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tokensUsed"], 3);
        assert_eq!(body["model"], "echo");
    }

    #[tokio::test]
    async fn test_echo_rejects_revoked_key() {
        let app = app(PortalConfig::default());
        let key = issue(&app, &ALICE, "short lived").await;
        let uri = format!("/keys/{}/revoke", key["id"].as_str().unwrap());
        send(&app, user_request(Method::POST, &uri, &ALICE, None)).await;

        let (status, _, body) = send(
            &app,
            echo_request(key["keyIdentifier"].as_str().unwrap(), json!({ "prompt": "hi" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn test_echo_requires_gateway_secret_when_configured() {
        let app = app(PortalConfig {
            apim_shared_secret: Some(secrecy::SecretString::from("gateway-shared".to_string())),
            ..Default::default()
        });
        let key = issue(&app, &ALICE, "behind gateway").await;
        let identifier = key["keyIdentifier"].as_str().unwrap();

        let (status, _, _) = send(&app, echo_request(identifier, json!({ "prompt": "hi" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut request = echo_request(identifier, json!({ "prompt": "hi" }));
        request
            .headers_mut()
            .insert("x-apim-secret", "gateway-shared".parse().unwrap());
        let (status, _, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_listings_tolerate_huge_paging() {
        let app = app(PortalConfig::default());
        issue(&app, &ALICE, "some activity").await;

        let (status, _, logs) = send(
            &app,
            user_request(
                Method::GET,
                "/admin/audit-logs?page=18446744073709551615&pageSize=100",
                &ADMIN,
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logs["page"], 1_000_000);
        assert!(logs["items"].as_array().unwrap().is_empty());

        let (status, _, users) = send(
            &app,
            user_request(Method::GET, "/admin/users?page=18446744073709551615", &ADMIN, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(users["items"].as_array().unwrap().is_empty());

        let (status, _, _) = send(
            &app,
            user_request(
                Method::GET,
                "/admin/registrations?limit=18446744073709551615",
                &ADMIN,
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_echo_rejects_unstorable_token_count() {
        let app = app(PortalConfig::default());
        let key = issue(&app, &ALICE, "huge counts").await;
        let identifier = key["keyIdentifier"].as_str().unwrap();

        let (status, _, body) = send(
            &app,
            echo_request(
                identifier,
                json!({ "prompt": "x", "tokensUsed": crate::domain::usage::MAX_EVENT_TOKENS + 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "tokensUsed");

        let usage_uri = format!("/admin/keys/{}/usage", key["id"].as_str().unwrap());
        let (_, _, usage) = send(&app, user_request(Method::GET, &usage_uri, &ADMIN, None)).await;
        assert_eq!(usage["tokensUsed"], 0);
    }

    #[tokio::test]
    async fn test_echo_requires_prompt() {
        let app = app(PortalConfig::default());
        let key = issue(&app, &ALICE, "empty prompts").await;

        let (status, _, body) = send(
            &app,
            echo_request(
                key["keyIdentifier"].as_str().unwrap(),
                json!({ "prompt": "", "tokensUsed": 5 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "prompt required");
        assert_eq!(body["error"]["param"], "prompt");

        let usage_uri = format!("/admin/keys/{}/usage", key["id"].as_str().unwrap());
        let (_, _, usage) = send(&app, user_request(Method::GET, &usage_uri, &ADMIN, None)).await;
        assert_eq!(usage["tokensUsed"], 0);
    }
}
