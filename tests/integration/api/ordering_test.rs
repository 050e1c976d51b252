//! Drag-and-drop reorder API tests

use axum::http::StatusCode;
use axum_test::TestResponse;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::assert_status;
use crate::common::{TestApp, TestUser};

async fn reorder(app: &TestApp, user: &TestUser, path: &str, ids: Value) -> TestResponse {
    app.server
        .put(path)
        .authorization_bearer(&user.token)
        .json(&json!({ "ids": ids }))
        .await
}

async fn category_names(app: &TestApp, user: &TestUser) -> Vec<String> {
    let snapshot: Value = app
        .server
        .get("/api/categories")
        .authorization_bearer(&user.token)
        .await
        .json();
    snapshot["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect()
}

async fn item_names(app: &TestApp, user: &TestUser, category: Uuid) -> Vec<String> {
    let items: Vec<Value> = app
        .server
        .get(&format!("/api/items?category_id={}", category))
        .authorization_bearer(&user.token)
        .await
        .json();
    items
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_reorder_categories_reads_back() {
    let app = TestApp::new();
    let user = app.register_paid("cantina").await;
    let a = app.create_category(&user.token, "Entradas").await;
    let b = app.create_category(&user.token, "Pratos").await;
    let c = app.create_category(&user.token, "Sobremesas").await;

    let response = reorder(&app, &user, "/api/categories/order", json!([c, a, b])).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.json::<Value>()["updated"], 3);
    assert_eq!(
        category_names(&app, &user).await,
        vec!["Sobremesas", "Entradas", "Pratos"]
    );
}

#[tokio::test]
async fn test_partial_reorder_appends_the_rest() {
    let app = TestApp::new();
    let user = app.register_paid("cantina").await;
    let a = app.create_category(&user.token, "Entradas").await;
    app.create_category(&user.token, "Pratos").await;
    let c = app.create_category(&user.token, "Sobremesas").await;

    let response = reorder(&app, &user, "/api/categories/order", json!([c, a])).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(
        category_names(&app, &user).await,
        vec!["Sobremesas", "Entradas", "Pratos"]
    );
}

#[tokio::test]
async fn test_empty_reorder_is_noop() {
    let app = TestApp::new();
    let user = app.register_paid("cantina").await;
    app.create_category(&user.token, "Entradas").await;

    let response = reorder(&app, &user, "/api/categories/order", json!([])).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.json::<Value>()["updated"], 0);
}

#[tokio::test]
async fn test_reorder_rejects_foreign_and_duplicate_ids() {
    let app = TestApp::new();
    let owner = app.register_paid("dona").await;
    let other = app.register_paid("vizinha").await;
    let mine = app.create_category(&owner.token, "Entradas").await;
    let second = app.create_category(&owner.token, "Pratos").await;
    let theirs = app.create_category(&other.token, "Lanches").await;

    let foreign = reorder(
        &app,
        &owner,
        "/api/categories/order",
        json!([second, theirs, mine]),
    )
    .await;
    assert_status!(foreign, StatusCode::FORBIDDEN);

    let duplicate = reorder(&app, &owner, "/api/categories/order", json!([mine, mine])).await;
    assert_status!(duplicate, StatusCode::BAD_REQUEST);

    // Nothing was written by the rejected requests
    assert_eq!(category_names(&app, &owner).await, vec!["Entradas", "Pratos"]);
}

#[tokio::test]
async fn test_reorder_items_within_category() {
    let app = TestApp::new();
    let user = app.register_paid("cantina").await;
    let bebidas = app.create_category(&user.token, "Bebidas").await;
    let pratos = app.create_category(&user.token, "Pratos").await;
    let suco = app.create_item(&user.token, bebidas, "Suco", 8.0).await;
    let cafe = app.create_item(&user.token, bebidas, "Café", 5.0).await;
    let agua = app.create_item(&user.token, bebidas, "Água", 4.0).await;
    let feijoada = app.create_item(&user.token, pratos, "Feijoada", 40.0).await;

    let path = format!("/api/categories/{}/items/order", bebidas);
    let response = reorder(&app, &user, &path, json!([agua, suco, cafe])).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(item_names(&app, &user, bebidas).await, vec!["Água", "Suco", "Café"]);

    // An item from a sibling category is not part of this list
    let cross = reorder(&app, &user, &path, json!([feijoada, suco])).await;
    assert_status!(cross, StatusCode::FORBIDDEN);

    let missing = reorder(
        &app,
        &user,
        &format!("/api/categories/{}/items/order", Uuid::new_v4()),
        json!([suco]),
    )
    .await;
    assert_status!(missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_every_permutation_reads_back_over_http() {
    let app = TestApp::new();
    let user = app.register_paid("cantina").await;
    let bebidas = app.create_category(&user.token, "Bebidas").await;
    let names = ["Suco", "Café", "Água", "Chá"];
    let mut ids = Vec::new();
    for name in names {
        ids.push(app.create_item(&user.token, bebidas, name, 5.0).await);
    }
    let path = format!("/api/categories/{}/items/order", bebidas);

    for order in permutations(&[0, 1, 2, 3]) {
        let submitted: Vec<Uuid> = order.iter().map(|&i| ids[i]).collect();
        let response = reorder(&app, &user, &path, json!(submitted)).await;
        assert_status!(response, StatusCode::OK);

        let expected: Vec<&str> = order.iter().map(|&i| names[i]).collect();
        assert_eq!(item_names(&app, &user, bebidas).await, expected, "order {:?}", order);
    }
}

fn permutations(values: &[usize]) -> Vec<Vec<usize>> {
    if values.len() <= 1 {
        return vec![values.to_vec()];
    }
    let mut all = Vec::new();
    for (i, &first) in values.iter().enumerate() {
        let mut rest = values.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, first);
            all.push(tail);
        }
    }
    all
}
