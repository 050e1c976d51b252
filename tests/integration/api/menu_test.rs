//! Public menu and menu settings tests

use axum::http::StatusCode;
use axum_test::TestResponse;
use serde_json::{json, Value};

use crate::assert_status;
use crate::common::{TestApp, TestUser};

async fn save_settings(app: &TestApp, user: &TestUser, settings: Value) -> TestResponse {
    app.server
        .put("/api/menu/settings")
        .authorization_bearer(&user.token)
        .json(&settings)
        .await
}

#[tokio::test]
async fn test_public_menu_formats_prices_in_brl() {
    let app = TestApp::new();
    let user = app.register_paid("Bar_Do_Ze").await;
    let bebidas = app.create_category(&user.token, "Bebidas").await;
    app.create_category(&user.token, "Vazia").await;
    app.create_item(&user.token, bebidas, "Suco", 8.5).await;
    app.create_item(&user.token, bebidas, "Vinho da casa", 1234.5).await;

    let menu = app.server.get("/api/menu/BAR_DO_ZE").await;
    assert_status!(menu, StatusCode::OK);
    let menu: Value = menu.json();
    assert_eq!(menu["username"], "bar_do_ze");
    assert_eq!(menu["title"], "bar_do_ze");

    let categories = menu["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1, "empty categories are hidden");
    assert_eq!(categories[0]["items"][0]["price_formatted"], "R$ 8,50");
    assert_eq!(categories[0]["items"][1]["price_formatted"], "R$ 1.234,50");
}

#[tokio::test]
async fn test_unknown_user_menu_is_not_found() {
    let app = TestApp::new();
    assert_status!(app.server.get("/api/menu/ninguem").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_round_trip_and_unpublish() {
    let app = TestApp::new();
    let user = app.register_paid("cantina").await;
    let bebidas = app.create_category(&user.token, "Bebidas").await;
    let item = app.create_item(&user.token, bebidas, "Suco", 8.0).await;
    app.server
        .put(&format!("/api/items/{}", item))
        .authorization_bearer(&user.token)
        .json(&json!({ "description": "Laranja ou limão" }))
        .await;

    let defaults = app
        .server
        .get("/api/menu/settings")
        .authorization_bearer(&user.token)
        .await;
    assert_status!(defaults, StatusCode::OK);
    assert_eq!(defaults.json::<Value>()["published"], true);

    let saved = save_settings(
        &app,
        &user,
        json!({
            "title": "  Cantina da Vila ",
            "subtitle": "Desde 1987",
            "accent_color": "#AA3300",
            "show_descriptions": false,
        }),
    )
    .await;
    assert_status!(saved, StatusCode::OK);
    let saved: Value = saved.json();
    assert_eq!(saved["title"], "Cantina da Vila");
    assert_eq!(saved["accent_color"], "#aa3300");

    let menu: Value = app.server.get("/api/menu/cantina").await.json();
    assert_eq!(menu["title"], "Cantina da Vila");
    assert_eq!(menu["subtitle"], "Desde 1987");
    assert!(menu["categories"][0]["items"][0].get("description").is_none());

    let hidden = save_settings(
        &app,
        &user,
        json!({ "title": "Cantina da Vila", "published": false }),
    )
    .await;
    assert_status!(hidden, StatusCode::OK);
    assert_status!(app.server.get("/api/menu/cantina").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_validation() {
    let app = TestApp::new();
    let user = app.register_paid("cantina").await;

    let bad_color = save_settings(
        &app,
        &user,
        json!({ "title": "Cantina", "accent_color": "red" }),
    )
    .await;
    assert_status!(bad_color, StatusCode::BAD_REQUEST);

    let no_title = save_settings(&app, &user, json!({ "title": " " })).await;
    assert_status!(no_title, StatusCode::BAD_REQUEST);
}
