//! Paid-capability gate tests

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use cardapio::backend::billing::models::{NewOneTimePayment, SubscriptionUpsert};
use cardapio::backend::server::config::ServerConfig;
use cardapio::backend::store::BillingRepository;

use crate::assert_status;
use crate::common::{test_config, TestApp, TEST_JWT_SECRET};

fn reajuste_body() -> serde_json::Value {
    json!({ "item_ids": [uuid::Uuid::new_v4()], "mode": "fixed", "magnitude": 1.0 })
}

#[tokio::test]
async fn test_free_user_reads_but_cannot_write() {
    let app = TestApp::new();
    let user = app.register("gratis").await;

    let server = &app.server;
    assert_status!(
        server.get("/api/categories").authorization_bearer(&user.token).await,
        StatusCode::OK
    );
    assert_status!(
        server.get("/api/items").authorization_bearer(&user.token).await,
        StatusCode::OK
    );

    let create = server
        .post("/api/categories")
        .authorization_bearer(&user.token)
        .json(&json!({ "name": "Bebidas" }))
        .await;
    assert_status!(create, StatusCode::PAYMENT_REQUIRED);

    let reajuste = server
        .post("/api/reajuste/apply")
        .authorization_bearer(&user.token)
        .json(&reajuste_body())
        .await;
    assert_status!(reajuste, StatusCode::PAYMENT_REQUIRED);

    assert_status!(
        server.get("/api/menu/settings").authorization_bearer(&user.token).await,
        StatusCode::PAYMENT_REQUIRED
    );

    // Paying must stay possible
    assert_status!(
        server.get("/api/billing/status").authorization_bearer(&user.token).await,
        StatusCode::OK
    );
    let me: Value = server.get("/api/auth/me").authorization_bearer(&user.token).await.json();
    assert_eq!(me["access"]["capabilities"], json!(["catalog:read"]));
}

#[tokio::test]
async fn test_active_subscription_opens_everything() {
    let app = TestApp::new();
    let user = app.register("assinante").await;
    app.repo
        .upsert_subscription(SubscriptionUpsert {
            user_id: user.id,
            stripe_subscription_id: "sub_active".into(),
            stripe_customer_id: Some("cus_1".into()),
            plan_id: None,
            status: "active".into(),
            current_period_end: Some(Utc::now() + Duration::days(30)),
            cancel_at_period_end: false,
        })
        .await
        .unwrap();

    let reajuste = app
        .server
        .post("/api/reajuste/apply")
        .authorization_bearer(&user.token)
        .json(&reajuste_body())
        .await;
    assert_status!(reajuste, StatusCode::OK);
    let create = app
        .server
        .post("/api/categories")
        .authorization_bearer(&user.token)
        .json(&json!({ "name": "Bebidas" }))
        .await;
    assert_status!(create, StatusCode::CREATED);

    let status: Value = app
        .server
        .get("/api/billing/status")
        .authorization_bearer(&user.token)
        .await
        .json();
    assert_eq!(status["reajuste_allowed"], true);
    assert_eq!(status["access"]["reason"], "subscription");
}

#[tokio::test]
async fn test_lapsed_billing_is_denied() {
    let app = TestApp::new();
    let user = app.register("atrasado").await;
    app.repo
        .upsert_subscription(SubscriptionUpsert {
            user_id: user.id,
            stripe_subscription_id: "sub_past_due".into(),
            stripe_customer_id: None,
            plan_id: None,
            status: "past_due".into(),
            current_period_end: Some(Utc::now() + Duration::days(3)),
            cancel_at_period_end: false,
        })
        .await
        .unwrap();
    app.repo
        .record_one_time_payment(NewOneTimePayment {
            user_id: user.id,
            stripe_checkout_session_id: "cs_old".into(),
            stripe_payment_intent_id: None,
            plan_id: None,
            amount_cents: 34900,
            currency: "brl".into(),
            status: "paid".into(),
            paid_at: Some(Utc::now() - Duration::days(400)),
            expires_at: Some(Utc::now() - Duration::days(35)),
        })
        .await
        .unwrap();

    let reajuste = app
        .server
        .post("/api/reajuste/apply")
        .authorization_bearer(&user.token)
        .json(&reajuste_body())
        .await;
    assert_status!(reajuste, StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_one_time_payment_grants_access() {
    let app = TestApp::new();
    let user = app.register("avista").await;
    app.repo
        .record_one_time_payment(NewOneTimePayment {
            user_id: user.id,
            stripe_checkout_session_id: "cs_paid".into(),
            stripe_payment_intent_id: Some("pi_1".into()),
            plan_id: None,
            amount_cents: 34900,
            currency: "brl".into(),
            status: "paid".into(),
            paid_at: Some(Utc::now()),
            expires_at: Some(Utc::now() + Duration::days(365)),
        })
        .await
        .unwrap();

    let me: Value = app
        .server
        .get("/api/auth/me")
        .authorization_bearer(&user.token)
        .await
        .json();
    assert_eq!(me["access"]["reason"], "one_time_payment");
    assert_status!(
        app.server.get("/api/menu/settings").authorization_bearer(&user.token).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_lifetime_usernames_from_config() {
    let config: ServerConfig = ServerConfig::builder()
        .jwt_secret(TEST_JWT_SECRET)
        .lifetime_usernames(vec!["Casa_Da_Mae".to_string()])
        .build();
    let app = TestApp::with_config(config);
    let vip = app.register("casa_da_mae").await;
    let regular = app.register("outra_casa").await;

    let apply = |token: &str| {
        app.server
            .post("/api/reajuste/apply")
            .authorization_bearer(token)
            .json(&reajuste_body())
    };
    assert_status!(apply(&vip.token).await, StatusCode::OK);
    assert_status!(apply(&regular.token).await, StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_trial_capabilities_are_configurable() {
    let mut config = test_config();
    config.access = ServerConfig::builder()
        .trial_capabilities(vec![])
        .build()
        .access;
    let app = TestApp::with_config(config);
    let user = app.register("sem_trial").await;

    assert_status!(
        app.server.get("/api/categories").authorization_bearer(&user.token).await,
        StatusCode::PAYMENT_REQUIRED
    );
}
