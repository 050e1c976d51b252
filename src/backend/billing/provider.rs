/**
 * Billing Provider
 *
 * The operations the service needs from Stripe, and the subset of Stripe
 * objects it reads. Handlers and the backfill job only see the trait, so
 * tests substitute a fake.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::PlanKind;
use super::BillingError;

/// Parameters for a hosted checkout page
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_id: String,
    pub price_id: String,
    pub kind: PlanKind,
    pub user_id: Uuid,
    pub plan_code: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortalSession {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
}

/// Stripe list envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct List<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Price {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionItem {
    pub price: Price,
    /// Newer API versions report the period on the item
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StripeSubscription {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    pub status: String,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub items: List<SubscriptionItem>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StripeSubscription {
    /// Price of the first subscription item
    pub fn price_id(&self) -> Option<&str> {
        self.items.data.first().map(|item| item.price.id.as_str())
    }

    pub fn period_end(&self) -> Option<DateTime<Utc>> {
        self.current_period_end
            .or_else(|| self.items.data.first().and_then(|i| i.current_period_end))
            .and_then(timestamp)
    }

    pub fn metadata_user_id(&self) -> Option<Uuid> {
        self.metadata.get("user_id").and_then(|id| Uuid::parse_str(id).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(default)]
    pub price: Option<Price>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StripeCheckoutSession {
    pub id: String,
    /// `subscription` or `payment`
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Present only when retrieved with `expand[]=line_items`
    #[serde(default)]
    pub line_items: Option<List<LineItem>>,
}

impl StripeCheckoutSession {
    /// Owning user: `client_reference_id`, then `metadata.user_id`
    pub fn user_id(&self) -> Option<Uuid> {
        self.client_reference_id
            .as_deref()
            .or_else(|| self.metadata.get("user_id").map(String::as_str))
            .and_then(|id| Uuid::parse_str(id).ok())
    }

    pub fn plan_code(&self) -> Option<&str> {
        self.metadata.get("plan_code").map(String::as_str)
    }

    pub fn line_item_price_id(&self) -> Option<&str> {
        self.line_items
            .as_ref()
            .and_then(|items| items.data.first())
            .and_then(|item| item.price.as_ref())
            .map(|price| price.id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StripeInvoice {
    pub id: String,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
}

/// Webhook envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Deserialize `data.object` as a concrete Stripe type
    pub fn object<T: serde::de::DeserializeOwned>(&self) -> Result<T, BillingError> {
        serde_json::from_value(self.data.object.clone()).map_err(|e| {
            BillingError::Payload(format!("{} object: {}", self.event_type, e))
        })
    }
}

pub(crate) fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Returns the new customer id
    async fn create_customer(&self, email: &str, user_id: Uuid) -> Result<String, BillingError>;

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError>;

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, BillingError>;

    async fn retrieve_subscription(&self, id: &str) -> Result<StripeSubscription, BillingError>;

    /// Includes expanded line items
    async fn retrieve_checkout_session(
        &self,
        id: &str,
    ) -> Result<StripeCheckoutSession, BillingError>;
}
