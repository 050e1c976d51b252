/**
 * Billing Records
 *
 * Plans ("planos"), subscriptions and one-time payments as stored locally.
 * Stripe remains the source of truth; these rows are updated from webhook
 * events and read by the access gate on every request.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Code of the default annual subscription plan
pub const PLAN_ANUAL: &str = "anual";
/// Code of the default one-time payment plan
pub const PLAN_UNICO: &str = "unico";

/// How a plan is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Recurring Stripe subscription
    Subscription,
    /// Single Stripe payment granting access for `access_days`
    OneTime,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::OneTime => "one_time",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "subscription" => Some(Self::Subscription),
            "one_time" => Some(Self::OneTime),
            _ => None,
        }
    }

    /// Stripe checkout mode for this kind
    pub fn checkout_mode(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::OneTime => "payment",
        }
    }
}

/// A billing plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    /// `subscription` or `one_time`
    pub kind: String,
    pub stripe_price_id: Option<String>,
    pub amount_cents: i64,
    pub currency: String,
    /// One-time plans only; `None` means the payment never expires
    pub access_days: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    pub fn plan_kind(&self) -> Option<PlanKind> {
        PlanKind::parse(&self.kind)
    }
}

/// Plan fields set by an admin or by startup seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInput {
    pub name: String,
    pub kind: PlanKind,
    #[serde(default)]
    pub stripe_price_id: Option<String>,
    pub amount_cents: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub access_days: Option<i32>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_currency() -> String {
    "brl".to_string()
}

fn default_active() -> bool {
    true
}

/// A Stripe subscription mirrored locally
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stripe_subscription_id: String,
    pub stripe_customer_id: Option<String>,
    /// Legacy rows may lack a plan; see the `backfill_plans` binary
    pub plan_id: Option<Uuid>,
    /// Stripe status string (`active`, `trialing`, `past_due`, `canceled`, ...)
    pub status: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Active or trialing, and the paid period has not ended
    pub fn grants_access(&self, now: DateTime<Utc>) -> bool {
        let status_ok = matches!(self.status.as_str(), "active" | "trialing");
        let period_ok = self.current_period_end.is_none_or(|end| end > now);
        status_ok && period_ok
    }
}

/// Values written when a subscription event arrives
#[derive(Debug, Clone)]
pub struct SubscriptionUpsert {
    pub user_id: Uuid,
    pub stripe_subscription_id: String,
    pub stripe_customer_id: Option<String>,
    /// `None` keeps the stored plan
    pub plan_id: Option<Uuid>,
    pub status: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

/// A one-time payment ("pagamento único")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct OneTimePayment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stripe_checkout_session_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub plan_id: Option<Uuid>,
    pub amount_cents: i64,
    pub currency: String,
    /// `paid`, `pending` or `refunded`
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OneTimePayment {
    /// Paid and not expired
    pub fn grants_access(&self, now: DateTime<Utc>) -> bool {
        self.status == "paid" && self.expires_at.is_none_or(|end| end > now)
    }
}

/// Values written when a one-time checkout completes
#[derive(Debug, Clone)]
pub struct NewOneTimePayment {
    pub user_id: Uuid,
    pub stripe_checkout_session_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub plan_id: Option<Uuid>,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}
