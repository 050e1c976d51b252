/**
 * Billing Handlers
 *
 * - `GET  /api/billing/plans`    - active plans (public)
 * - `POST /api/billing/checkout` - hosted checkout for a plan
 * - `POST /api/billing/portal`   - Stripe customer portal
 * - `GET  /api/billing/status`   - the caller's billing records and access
 * - `POST /api/billing/webhook`  - Stripe events (signature-verified)
 *
 * None of these routes sit behind the access gate: an unpaid user must be
 * able to pay.
 */

use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::models::{OneTimePayment, Plan, Subscription};
use super::provider::{CheckoutRequest, CheckoutSession, PortalSession};
use super::webhook::{handle_webhook, WebhookOutcome};
use crate::backend::access::{evaluate, summarize, AccessInput, AccessSummary, Capability};
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;

/// Header carrying the Stripe webhook signature
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutBody {
    pub plan_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingStatus {
    pub subscriptions: Vec<Subscription>,
    pub payments: Vec<OneTimePayment>,
    /// Whether the caller may run reajustes right now
    pub reajuste_allowed: bool,
    pub access: AccessSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: WebhookOutcome,
}

/// List plans a user can buy
pub async fn list_plans(State(state): State<AppState>) -> ApiResult<Json<Vec<Plan>>> {
    let plans = state.repo.list_plans(true).await?;
    Ok(Json(plans))
}

/// Start a checkout for `plan_code`.
///
/// Reuses the user's Stripe customer, creating one on first purchase. The
/// session carries the user id as `client_reference_id` and in metadata so
/// the webhook can attribute the payment.
pub async fn create_checkout(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(body): Json<CheckoutBody>,
) -> ApiResult<Json<CheckoutSession>> {
    let plan = state
        .repo
        .plan_by_code(body.plan_code.trim())
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| BackendError::not_found("Plan"))?;

    let kind = plan.plan_kind().ok_or_else(|| {
        tracing::error!("Plan '{}' has unknown kind '{}'", plan.code, plan.kind);
        BackendError::service_unavailable("Plan is misconfigured")
    })?;
    let price_id = plan.stripe_price_id.clone().ok_or_else(|| {
        tracing::error!("Plan '{}' has no Stripe price", plan.code);
        BackendError::service_unavailable("Plan is not available for purchase yet")
    })?;

    let customer_id = match auth.user.stripe_customer_id.clone() {
        Some(id) => id,
        None => {
            let id = state.billing.create_customer(&auth.email, auth.user_id).await?;
            state.repo.set_stripe_customer_id(auth.user_id, &id).await?;
            tracing::info!("Created Stripe customer {} for user {}", id, auth.user_id);
            id
        }
    };

    let base = &state.config.app_base_url;
    let session = state
        .billing
        .create_checkout_session(&CheckoutRequest {
            customer_id,
            price_id,
            kind,
            user_id: auth.user_id,
            plan_code: plan.code.clone(),
            success_url: format!("{}/billing/success?session_id={{CHECKOUT_SESSION_ID}}", base),
            cancel_url: format!("{}/billing/cancel", base),
        })
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        plan = %plan.code,
        session_id = %session.id,
        "Checkout session created"
    );
    Ok(Json(session))
}

/// Open the Stripe customer portal
pub async fn create_portal(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<PortalSession>> {
    let customer_id = auth
        .user
        .stripe_customer_id
        .as_deref()
        .ok_or_else(|| BackendError::not_found("Billing customer"))?;

    let return_url = format!("{}/billing", state.config.app_base_url);
    let session = state
        .billing
        .create_portal_session(customer_id, &return_url)
        .await?;
    Ok(Json(session))
}

/// Caller's subscriptions, payments and access
pub async fn billing_status(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<BillingStatus>> {
    let input = AccessInput::load(state.repo.as_ref(), &auth.user).await?;
    let policy = &state.config.access;

    Ok(Json(BillingStatus {
        reajuste_allowed: evaluate(policy, &input, Capability::Reajuste).is_granted(),
        access: summarize(policy, &input),
        subscriptions: input.subscriptions,
        payments: input.payments,
    }))
}

/// Stripe webhook endpoint.
///
/// The body is taken as a raw string: the signature covers the exact bytes
/// Stripe sent.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Json<WebhookAck>> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let outcome = handle_webhook(
        state.repo.as_ref(),
        state.billing.as_ref(),
        state.config.stripe.webhook_secret.as_deref(),
        &body,
        signature,
        Utc::now(),
    )
    .await?;

    Ok(Json(WebhookAck {
        received: true,
        outcome,
    }))
}
