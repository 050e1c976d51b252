//! Stripe REST client tests against a mock server

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cardapio::backend::billing::models::PlanKind;
use cardapio::backend::billing::provider::{BillingProvider, CheckoutRequest};
use cardapio::backend::billing::{BillingError, StripeClient};

const KEY: &str = "sk_test_123";

#[tokio::test]
async fn test_create_customer_sends_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/customers"))
        .and(header("authorization", "Bearer sk_test_123"))
        .and(body_string_contains("email=dono%40bar.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "cus_abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StripeClient::new(KEY, server.uri());
    let id = client.create_customer("dono@bar.test", Uuid::new_v4()).await.unwrap();
    assert_eq!(id, "cus_abc");
}

#[tokio::test]
async fn test_checkout_session_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(body_string_contains("mode=payment"))
        .and(body_string_contains("line_items%5B0%5D%5Bprice%5D=price_unico"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_1",
            "url": "https://checkout.stripe.com/c/cs_1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StripeClient::new(KEY, server.uri());
    let session = client
        .create_checkout_session(&CheckoutRequest {
            customer_id: "cus_abc".into(),
            price_id: "price_unico".into(),
            kind: PlanKind::OneTime,
            user_id: Uuid::new_v4(),
            plan_code: "unico".into(),
            success_url: "https://cardapio.test/billing/success".into(),
            cancel_url: "https://cardapio.test/billing/cancel".into(),
        })
        .await
        .unwrap();
    assert_eq!(session.id, "cs_1");
    assert_eq!(session.url.as_deref(), Some("https://checkout.stripe.com/c/cs_1"));
}

#[tokio::test]
async fn test_retrieve_checkout_session_expands_line_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/checkout/sessions/cs_1"))
        .and(query_param("expand[]", "line_items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_1",
            "mode": "payment",
            "line_items": { "object": "list", "data": [ { "price": { "id": "price_unico" } } ] }
        })))
        .mount(&server)
        .await;

    let client = StripeClient::new(KEY, server.uri());
    let session = client.retrieve_checkout_session("cs_1").await.unwrap();
    assert_eq!(session.line_item_price_id(), Some("price_unico"));
}

#[tokio::test]
async fn test_api_errors_carry_stripe_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/subscriptions/sub_missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "invalid_request_error", "message": "No such subscription: 'sub_missing'" }
        })))
        .mount(&server)
        .await;

    let client = StripeClient::new(KEY, server.uri());
    match client.retrieve_subscription("sub_missing").await {
        Err(BillingError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "No such subscription: 'sub_missing'");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}
