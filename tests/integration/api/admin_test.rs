//! Administrator endpoint tests

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::assert_status;
use crate::common::TestApp;

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let app = TestApp::new();
    let user = app.register_paid("comum").await;

    assert_status!(
        app.server.get("/api/admin/users").authorization_bearer(&user.token).await,
        StatusCode::FORBIDDEN
    );
    let flags = app
        .server
        .patch(&format!("/api/admin/users/{}", user.id))
        .authorization_bearer(&user.token)
        .json(&json!({ "is_admin": true }))
        .await;
    assert_status!(flags, StatusCode::FORBIDDEN);
    assert_status!(app.server.get("/api/admin/users").await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_grants_lifetime_access() {
    let app = TestApp::new();
    let admin = app.register_admin("chefe").await;
    let user = app.register("freguesa").await;

    let users = app.server.get("/api/admin/users").authorization_bearer(&admin.token).await;
    assert_status!(users, StatusCode::OK);
    assert_eq!(users.json::<Vec<Value>>().len(), 2);

    let granted = app
        .server
        .patch(&format!("/api/admin/users/{}", user.id))
        .authorization_bearer(&admin.token)
        .json(&json!({ "lifetime_access": true }))
        .await;
    assert_status!(granted, StatusCode::OK);
    let granted: Value = granted.json();
    assert_eq!(granted["lifetime_access"], true);
    assert_eq!(granted["is_admin"], false);

    let me: Value = app
        .server
        .get("/api/auth/me")
        .authorization_bearer(&user.token)
        .await
        .json();
    assert_eq!(me["access"]["reason"], "lifetime");
}

#[tokio::test]
async fn test_admin_cannot_demote_self() {
    let app = TestApp::new();
    let admin = app.register_admin("chefe").await;
    let response = app
        .server
        .patch(&format!("/api/admin/users/{}", admin.id))
        .authorization_bearer(&admin.token)
        .json(&json!({ "is_admin": false }))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_manages_plans() {
    let app = TestApp::new();
    let admin = app.register_admin("chefe").await;

    let created = app
        .server
        .put("/api/admin/plans/semestral")
        .authorization_bearer(&admin.token)
        .json(&json!({
            "name": "Plano Semestral",
            "kind": "subscription",
            "stripe_price_id": "price_semestral",
            "amount_cents": 17900,
        }))
        .await;
    assert_status!(created, StatusCode::OK);
    let created: Value = created.json();
    assert_eq!(created["currency"], "brl");
    assert_eq!(created["active"], true);

    let retired = app
        .server
        .put("/api/admin/plans/semestral")
        .authorization_bearer(&admin.token)
        .json(&json!({
            "name": "Plano Semestral",
            "kind": "subscription",
            "amount_cents": 17900,
            "active": false,
        }))
        .await;
    assert_status!(retired, StatusCode::OK);

    let public: Vec<Value> = app.server.get("/api/billing/plans").await.json();
    assert!(public.is_empty());
    let all: Vec<Value> = app
        .server
        .get("/api/admin/plans")
        .authorization_bearer(&admin.token)
        .await
        .json();
    assert_eq!(all.len(), 1);

    let invalid = app
        .server
        .put("/api/admin/plans/NotValid")
        .authorization_bearer(&admin.token)
        .json(&json!({ "name": "X", "kind": "one_time", "amount_cents": 100, "access_days": 0 }))
        .await;
    assert_status!(invalid, StatusCode::BAD_REQUEST);
}
