//! Bulk price adjustment ("reajuste") API tests

use axum::http::StatusCode;
use axum_test::TestResponse;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::{TestApp, TestUser};
use crate::{assert_approx_eq, assert_status};

async fn item(app: &TestApp, user: &TestUser, id: Uuid) -> Value {
    let items: Vec<Value> = app
        .server
        .get("/api/items")
        .authorization_bearer(&user.token)
        .await
        .json();
    items
        .into_iter()
        .find(|i| i["id"] == id.to_string())
        .expect("item listed")
}

async fn send(app: &TestApp, user: &TestUser, path: &str, body: Value) -> TestResponse {
    app.server
        .post(path)
        .authorization_bearer(&user.token)
        .json(&body)
        .await
}

async fn setup(prices: &[f64]) -> (TestApp, TestUser, Vec<Uuid>) {
    let app = TestApp::new();
    let user = app.register_paid("cantina").await;
    let category = app.create_category(&user.token, "Pratos").await;
    let mut ids = Vec::new();
    for (i, price) in prices.iter().enumerate() {
        ids.push(app.create_item(&user.token, category, &format!("Prato {}", i), *price).await);
    }
    (app, user, ids)
}

#[tokio::test]
async fn test_preview_then_confirm() {
    let (app, user, ids) = setup(&[20.0, 50.0]).await;

    let preview = send(
        &app,
        &user,
        "/api/reajuste/preview",
        json!({ "item_ids": ids, "mode": "percentage", "magnitude": 10.0 }),
    )
    .await;
    assert_status!(preview, StatusCode::OK);
    let preview: Value = preview.json();
    assert_eq!(preview["succeeded"], 2);
    assert_approx_eq!(preview["results"][0]["new_price"].as_f64().unwrap(), 22.0);

    let staged = item(&app, &user, ids[0]).await;
    assert_eq!(staged["price"], 20.0);
    assert_approx_eq!(staged["new_price"].as_f64().unwrap(), 22.0);

    let confirm = send(&app, &user, "/api/reajuste/confirm", json!({ "item_ids": ids })).await;
    assert_status!(confirm, StatusCode::OK);
    assert_eq!(confirm.json::<Value>()["succeeded"], 2);

    let first = item(&app, &user, ids[0]).await;
    assert_approx_eq!(first["price"].as_f64().unwrap(), 22.0);
    assert!(first["new_price"].is_null());
    let second = item(&app, &user, ids[1]).await;
    assert_approx_eq!(second["price"].as_f64().unwrap(), 55.0);
}

#[tokio::test]
async fn test_discard_drops_staged_prices() {
    let (app, user, ids) = setup(&[20.0, 30.0]).await;
    send(
        &app,
        &user,
        "/api/reajuste/preview",
        json!({ "item_ids": [ids[0]], "mode": "fixed", "magnitude": 5.0 }),
    )
    .await;

    let discard = send(&app, &user, "/api/reajuste/discard", json!({ "item_ids": ids })).await;
    assert_status!(discard, StatusCode::OK);
    let discard: Value = discard.json();
    assert_eq!(discard["succeeded"], 1);
    assert_eq!(discard["skipped"], 1);
    assert_eq!(discard["results"][1]["skip_reason"], "nothing_staged");

    let first = item(&app, &user, ids[0]).await;
    assert_eq!(first["price"], 20.0);
    assert!(first["new_price"].is_null());
}

#[tokio::test]
async fn test_apply_fixed_amount() {
    let (app, user, ids) = setup(&[20.0]).await;
    let apply = send(
        &app,
        &user,
        "/api/reajuste/apply",
        json!({ "item_ids": ids, "mode": "fixed", "magnitude": 5.0 }),
    )
    .await;
    assert_status!(apply, StatusCode::OK);
    let apply: Value = apply.json();
    assert_eq!(apply["results"][0]["old_price"], 20.0);
    assert_eq!(apply["results"][0]["new_price"], 25.0);
    assert_eq!(item(&app, &user, ids[0]).await["price"], 25.0);
}

#[tokio::test]
async fn test_decrease_is_not_clamped_and_negative_prices_are_skipped() {
    let (app, user, ids) = setup(&[3.0, 10.0]).await;
    let apply = send(
        &app,
        &user,
        "/api/reajuste/apply",
        json!({ "item_ids": ids, "mode": "fixed", "magnitude": -5.0 }),
    )
    .await;
    assert_status!(apply, StatusCode::OK);
    assert_eq!(apply.json::<Value>()["succeeded"], 2);
    assert_eq!(item(&app, &user, ids[0]).await["price"], -2.0);
    assert_eq!(item(&app, &user, ids[1]).await["price"], 5.0);

    let again: Value = send(
        &app,
        &user,
        "/api/reajuste/apply",
        json!({ "item_ids": ids, "mode": "percentage", "magnitude": 10.0 }),
    )
    .await
    .json();
    assert_eq!(again["skipped"], 1);
    assert_eq!(again["results"][0]["skip_reason"], "negative_price");
    assert_eq!(item(&app, &user, ids[0]).await["price"], -2.0);
}

#[tokio::test]
async fn test_backup_and_restore() {
    let (app, user, ids) = setup(&[20.0]).await;

    let restore_without_backup: Value =
        send(&app, &user, "/api/items/restore", json!({ "item_ids": ids }))
            .await
            .json();
    assert_eq!(restore_without_backup["results"][0]["skip_reason"], "no_backup");

    let backup = send(&app, &user, "/api/items/backup", json!({ "item_ids": ids })).await;
    assert_status!(backup, StatusCode::OK);
    assert_eq!(item(&app, &user, ids[0]).await["backup_price"], 20.0);

    send(
        &app,
        &user,
        "/api/reajuste/apply",
        json!({ "item_ids": ids, "mode": "percentage", "magnitude": 50.0 }),
    )
    .await;
    assert_eq!(item(&app, &user, ids[0]).await["price"], 30.0);

    let restore = send(&app, &user, "/api/items/restore", json!({ "item_ids": ids })).await;
    assert_status!(restore, StatusCode::OK);
    let restored = item(&app, &user, ids[0]).await;
    assert_eq!(restored["price"], 20.0);
    assert_eq!(restored["backup_price"], 20.0);
}

#[tokio::test]
async fn test_foreign_items_fail_without_blocking_the_rest() {
    let (app, user, ids) = setup(&[10.0]).await;
    let stranger = Uuid::new_v4();
    let apply = send(
        &app,
        &user,
        "/api/reajuste/apply",
        json!({ "item_ids": [stranger, ids[0]], "mode": "fixed", "magnitude": 1.0 }),
    )
    .await;
    assert_status!(apply, StatusCode::OK);
    let apply: Value = apply.json();
    assert_eq!(apply["failed"], 1);
    assert_eq!(apply["succeeded"], 1);
    assert_eq!(apply["results"][0]["status"], "failed");
    assert_eq!(item(&app, &user, ids[0]).await["price"], 11.0);
}

#[tokio::test]
async fn test_request_validation() {
    let (app, user, ids) = setup(&[10.0]).await;
    let cases = [
        json!({ "item_ids": [], "mode": "fixed", "magnitude": 1.0 }),
        json!({ "item_ids": [ids[0], ids[0]], "mode": "fixed", "magnitude": 1.0 }),
        json!({ "item_ids": ids, "mode": "fixed", "magnitude": 0.0 }),
    ];
    for body in cases {
        let response = send(&app, &user, "/api/reajuste/apply", body.clone()).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "accepted {}", body);
    }
    assert_eq!(item(&app, &user, ids[0]).await["price"], 10.0);
}
