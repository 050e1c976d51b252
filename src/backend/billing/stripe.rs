/**
 * Stripe REST Client
 *
 * Form-encoded requests against the Stripe API with the secret key as a
 * bearer token. The base URL is configurable so tests can point the client
 * at a mock server.
 */

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use super::models::PlanKind;
use super::provider::{
    BillingProvider, CheckoutRequest, CheckoutSession, Customer, PortalSession,
    StripeCheckoutSession, StripeSubscription,
};
use super::BillingError;
use crate::backend::server::config::StripeConfig;

#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    secret_key: String,
    api_base: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// `None` when no secret key is configured
    pub fn from_config(config: &StripeConfig) -> Option<Self> {
        config
            .secret_key
            .as_ref()
            .map(|key| Self::new(key.clone(), config.api_base.clone()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_base, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BillingError> {
        let response = request.bearer_auth(&self.secret_key).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            tracing::error!("Stripe returned {}: {}", status, message);
            return Err(BillingError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

/// Form fields for a checkout session
fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let user_id = request.user_id.to_string();
    let mut form = vec![
        ("mode".to_string(), request.kind.checkout_mode().to_string()),
        ("customer".to_string(), request.customer_id.clone()),
        ("client_reference_id".to_string(), user_id.clone()),
        ("line_items[0][price]".to_string(), request.price_id.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("metadata[user_id]".to_string(), user_id.clone()),
        ("metadata[plan_code]".to_string(), request.plan_code.clone()),
    ];
    let nested = match request.kind {
        PlanKind::Subscription => "subscription_data",
        PlanKind::OneTime => "payment_intent_data",
    };
    form.push((format!("{}[metadata][user_id]", nested), user_id));
    form.push((format!("{}[metadata][plan_code]", nested), request.plan_code.clone()));
    form
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn create_customer(&self, email: &str, user_id: Uuid) -> Result<String, BillingError> {
        let form = [
            ("email", email.to_string()),
            ("metadata[user_id]", user_id.to_string()),
        ];
        let customer: Customer = self
            .send(self.http.post(self.url("customers")).form(&form))
            .await?;
        tracing::info!("Created Stripe customer {} for user {}", customer.id, user_id);
        Ok(customer.id)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        let form = checkout_form(request);
        self.send(self.http.post(self.url("checkout/sessions")).form(&form))
            .await
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, BillingError> {
        let form = [("customer", customer_id), ("return_url", return_url)];
        self.send(self.http.post(self.url("billing_portal/sessions")).form(&form))
            .await
    }

    async fn retrieve_subscription(&self, id: &str) -> Result<StripeSubscription, BillingError> {
        self.send(self.http.get(self.url(&format!("subscriptions/{}", id))))
            .await
    }

    async fn retrieve_checkout_session(
        &self,
        id: &str,
    ) -> Result<StripeCheckoutSession, BillingError> {
        let request = self
            .http
            .get(self.url(&format!("checkout/sessions/{}", id)))
            .query(&[("expand[]", "line_items")]);
        self.send(request).await
    }
}

/// Provider used when no Stripe key is configured
#[derive(Debug, Default, Clone)]
pub struct DisabledBilling;

#[async_trait]
impl BillingProvider for DisabledBilling {
    async fn create_customer(&self, _email: &str, _user_id: Uuid) -> Result<String, BillingError> {
        Err(BillingError::NotConfigured("Stripe"))
    }

    async fn create_checkout_session(
        &self,
        _request: &CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        Err(BillingError::NotConfigured("Stripe"))
    }

    async fn create_portal_session(
        &self,
        _customer_id: &str,
        _return_url: &str,
    ) -> Result<PortalSession, BillingError> {
        Err(BillingError::NotConfigured("Stripe"))
    }

    async fn retrieve_subscription(&self, _id: &str) -> Result<StripeSubscription, BillingError> {
        Err(BillingError::NotConfigured("Stripe"))
    }

    async fn retrieve_checkout_session(
        &self,
        _id: &str,
    ) -> Result<StripeCheckoutSession, BillingError> {
        Err(BillingError::NotConfigured("Stripe"))
    }
}
