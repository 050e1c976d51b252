//! Authentication API tests

use axum::http::StatusCode;
use axum_test::TestResponse;
use serde_json::{json, Value};

use cardapio::backend::store::UserRepository;

use crate::assert_status;
use crate::common::{TestApp, TEST_PASSWORD};

async fn login(app: &TestApp, username: &str, password: &str) -> TestResponse {
    app.server
        .post("/api/auth/login")
        .json(&json!({ "username": username, "password": password }))
        .await
}

#[tokio::test]
async fn test_register_then_me() {
    let app = TestApp::new();
    let user = app.register("Bar_Do_Ze").await;
    assert_eq!(user.username, "bar_do_ze");

    let me = app.server.get("/api/auth/me").authorization_bearer(&user.token).await;
    assert_status!(me, StatusCode::OK);
    let me: Value = me.json();
    assert_eq!(me["user"]["username"], "bar_do_ze");
    assert_eq!(me["user"]["email"], "bar_do_ze@cardapio.test");
    assert_eq!(me["access"]["has_paid_access"], false);
    assert!(me["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = TestApp::new();
    let cases = [
        json!({ "username": "1abc", "email": "a@a.com", "password": TEST_PASSWORD }),
        json!({ "username": "ab", "email": "a@a.com", "password": TEST_PASSWORD }),
        json!({ "username": "settings", "email": "a@a.com", "password": TEST_PASSWORD }),
        json!({ "username": "valid_name", "email": "not-an-email", "password": TEST_PASSWORD }),
        json!({ "username": "valid_name", "email": "a@a.com", "password": "curta" }),
    ];
    for body in cases {
        let response = app.server.post("/api/auth/register").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "accepted {}", body);
    }
}

#[tokio::test]
async fn test_register_duplicates_conflict() {
    let app = TestApp::new();
    app.register("cantina").await;

    let same_name = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "username": "CANTINA", "email": "outro@cardapio.test", "password": TEST_PASSWORD }))
        .await;
    assert_status!(same_name, StatusCode::CONFLICT);

    let same_email = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "username": "outra", "email": "Cantina@Cardapio.test", "password": TEST_PASSWORD }))
        .await;
    assert_status!(same_email, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_by_username_or_email() {
    let app = TestApp::new();
    let user = app.register("padaria").await;

    let by_name = login(&app, "Padaria", TEST_PASSWORD).await;
    assert_status!(by_name, StatusCode::OK);
    assert_eq!(by_name.json::<Value>()["user"]["id"], user.id.to_string());

    let by_email = login(&app, &user.email, TEST_PASSWORD).await;
    assert_status!(by_email, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register("padaria").await;

    let wrong_password = login(&app, "padaria", "errada-123").await;
    let unknown_user = login(&app, "ninguem", TEST_PASSWORD).await;

    assert_status!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_status!(unknown_user, StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<Value>()["error"],
        unknown_user.json::<Value>()["error"]
    );
}

#[tokio::test]
async fn test_protected_routes_need_valid_token() {
    let app = TestApp::new();
    assert_status!(app.server.get("/api/auth/me").await, StatusCode::UNAUTHORIZED);
    assert_status!(
        app.server.get("/api/auth/me").authorization_bearer("not-a-jwt").await,
        StatusCode::UNAUTHORIZED
    );
    assert_status!(app.server.get("/api/categories").await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let user = app.register("lanchonete").await;

    let wrong = app
        .server
        .put("/api/auth/password")
        .authorization_bearer(&user.token)
        .json(&json!({ "current_password": "errada-123", "new_password": "nova-senha-456" }))
        .await;
    assert_status!(wrong, StatusCode::FORBIDDEN);

    let changed = app
        .server
        .put("/api/auth/password")
        .authorization_bearer(&user.token)
        .json(&json!({ "current_password": TEST_PASSWORD, "new_password": "nova-senha-456" }))
        .await;
    assert_status!(changed, StatusCode::OK);

    assert_status!(login(&app, "lanchonete", TEST_PASSWORD).await, StatusCode::UNAUTHORIZED);
    assert_status!(login(&app, "lanchonete", "nova-senha-456").await, StatusCode::OK);
}

#[tokio::test]
async fn test_change_email_issues_new_token() {
    let app = TestApp::new();
    let user = app.register("pizzaria").await;
    app.register("concorrente").await;

    let taken = app
        .server
        .put("/api/auth/email")
        .authorization_bearer(&user.token)
        .json(&json!({ "email": "concorrente@cardapio.test", "current_password": TEST_PASSWORD }))
        .await;
    assert_status!(taken, StatusCode::CONFLICT);

    let changed = app
        .server
        .put("/api/auth/email")
        .authorization_bearer(&user.token)
        .json(&json!({ "email": "Contato@Pizzaria.test", "current_password": TEST_PASSWORD }))
        .await;
    assert_status!(changed, StatusCode::OK);
    let changed: Value = changed.json();
    assert_eq!(changed["user"]["email"], "contato@pizzaria.test");

    let token = changed["token"].as_str().unwrap();
    let me: Value = app
        .server
        .get("/api/auth/me")
        .authorization_bearer(token)
        .await
        .json();
    assert_eq!(me["user"]["email"], "contato@pizzaria.test");
}

fn token_from_mail(body: &str) -> String {
    body.split("token=")
        .nth(1)
        .expect("mail has no token")
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new();
    let user = app.register("sorveteria").await;

    let unknown = app
        .server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": "ninguem@cardapio.test" }))
        .await;
    assert_status!(unknown, StatusCode::OK);
    assert_eq!(app.mailer.count(), 0);

    let known = app
        .server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": user.email }))
        .await;
    assert_status!(known, StatusCode::OK);
    assert_eq!(known.json::<Value>(), unknown.json::<Value>());

    let mail = app.mailer.last().expect("reset mail sent");
    assert_eq!(mail.to, user.email);
    assert!(mail.body.contains("https://cardapio.test/reset-password?token="));
    let token = token_from_mail(&mail.body);

    let reset = app
        .server
        .post("/api/auth/reset-password")
        .json(&json!({ "token": token, "new_password": "redefinida-789" }))
        .await;
    assert_status!(reset, StatusCode::OK);

    assert_status!(login(&app, "sorveteria", "redefinida-789").await, StatusCode::OK);

    let reused = app
        .server
        .post("/api/auth/reset-password")
        .json(&json!({ "token": token, "new_password": "outra-senha-000" }))
        .await;
    assert_status!(reused, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forgot_password_hides_mail_failures() {
    let app = TestApp::new();
    let user = app.register("confeitaria").await;
    app.mailer.fail_sends();

    let response = app
        .server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": user.email }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(app.mailer.count(), 0);

    // The token was still stored, so a retry after the outage works
    let stored = app.repo.user_by_email(&user.email).await.unwrap().unwrap();
    assert!(stored.reset_token_hash.is_some());
}
