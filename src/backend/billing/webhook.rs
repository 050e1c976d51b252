/**
 * Webhook Processing
 *
 * Each Stripe event id takes effect at most once: processed ids are recorded
 * in `processed_webhook_events` after the handler succeeds, and a repeated
 * delivery is acknowledged without touching anything. A failing handler
 * leaves the id unrecorded so Stripe's retry gets another chance.
 *
 * # Handled Events
 *
 * - `checkout.session.completed` - links the customer, then records the
 *   subscription (mode `subscription`) or the one-time payment (mode `payment`)
 * - `customer.subscription.created|updated|deleted` - mirrors the subscription
 * - `invoice.paid` - re-reads the subscription from Stripe and mirrors it
 * - `invoice.payment_failed` - marks the subscription `past_due`
 *
 * Other event types are acknowledged and recorded.
 */

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::models::{NewOneTimePayment, Subscription, SubscriptionUpsert};
use super::plans::resolve_plan;
use super::provider::{
    BillingProvider, StripeCheckoutSession, StripeEvent, StripeInvoice, StripeSubscription,
};
use super::signature::verify_signature;
use super::BillingError;
use crate::backend::store::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// The event changed local state
    Processed,
    /// Already seen; nothing done
    Duplicate,
    /// Event type or object the service does not act on
    Ignored,
}

/// Verify, deduplicate and apply one webhook delivery
pub async fn handle_webhook(
    repo: &dyn Repository,
    provider: &dyn BillingProvider,
    webhook_secret: Option<&str>,
    payload: &str,
    signature: Option<&str>,
    now: DateTime<Utc>,
) -> Result<WebhookOutcome, BillingError> {
    let secret = webhook_secret.ok_or(BillingError::NotConfigured("STRIPE_WEBHOOK_SECRET"))?;
    let signature = signature
        .ok_or_else(|| BillingError::Signature("missing Stripe-Signature header".to_string()))?;
    verify_signature(secret, payload, signature, now.timestamp())?;

    let event: StripeEvent = serde_json::from_str(payload)
        .map_err(|e| BillingError::Payload(format!("event: {}", e)))?;

    if repo.is_event_processed(&event.id).await? {
        tracing::info!("Webhook event {} already processed, skipping", event.id);
        return Ok(WebhookOutcome::Duplicate);
    }

    let outcome = process_event(repo, provider, &event, now).await?;
    repo.mark_event_processed(&event.id, &event.event_type).await?;
    tracing::info!(
        event_id = %event.id,
        event_type = %event.event_type,
        outcome = ?outcome,
        "Webhook event handled"
    );
    Ok(outcome)
}

/// Apply an already-verified event
pub async fn process_event(
    repo: &dyn Repository,
    provider: &dyn BillingProvider,
    event: &StripeEvent,
    now: DateTime<Utc>,
) -> Result<WebhookOutcome, BillingError> {
    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let session: StripeCheckoutSession = event.object()?;
            checkout_completed(repo, provider, &session, now).await
        }
        "customer.subscription.created"
        | "customer.subscription.updated"
        | "customer.subscription.deleted" => {
            let subscription: StripeSubscription = event.object()?;
            Ok(match sync_subscription(repo, &subscription, None, None).await? {
                Some(_) => WebhookOutcome::Processed,
                None => WebhookOutcome::Ignored,
            })
        }
        "invoice.paid" => {
            let invoice: StripeInvoice = event.object()?;
            let Some(subscription_id) = invoice.subscription else {
                return Ok(WebhookOutcome::Ignored);
            };
            let subscription = provider.retrieve_subscription(&subscription_id).await?;
            Ok(match sync_subscription(repo, &subscription, None, None).await? {
                Some(_) => WebhookOutcome::Processed,
                None => WebhookOutcome::Ignored,
            })
        }
        "invoice.payment_failed" => {
            let invoice: StripeInvoice = event.object()?;
            let Some(subscription_id) = invoice.subscription else {
                return Ok(WebhookOutcome::Ignored);
            };
            let updated = repo
                .update_subscription_status(&subscription_id, "past_due", None)
                .await?;
            if updated.is_none() {
                tracing::warn!("Payment failed for unknown subscription {}", subscription_id);
                return Ok(WebhookOutcome::Ignored);
            }
            Ok(WebhookOutcome::Processed)
        }
        other => {
            tracing::debug!("Ignoring webhook event type {}", other);
            Ok(WebhookOutcome::Ignored)
        }
    }
}

async fn checkout_completed(
    repo: &dyn Repository,
    provider: &dyn BillingProvider,
    session: &StripeCheckoutSession,
    now: DateTime<Utc>,
) -> Result<WebhookOutcome, BillingError> {
    let Some(user_id) = resolve_session_user(repo, session).await? else {
        tracing::warn!("Checkout session {} has no known user", session.id);
        return Ok(WebhookOutcome::Ignored);
    };

    if let Some(customer) = &session.customer {
        if let Some(user) = repo.user_by_id(user_id).await? {
            if user.stripe_customer_id.is_none() {
                repo.set_stripe_customer_id(user_id, customer).await?;
            }
        }
    }

    match session.mode.as_deref() {
        Some("subscription") => {
            let Some(subscription_id) = &session.subscription else {
                return Err(BillingError::Payload(format!(
                    "subscription checkout {} without subscription id",
                    session.id
                )));
            };
            let subscription = provider.retrieve_subscription(subscription_id).await?;
            sync_subscription(repo, &subscription, Some(user_id), session.plan_code()).await?;
            Ok(WebhookOutcome::Processed)
        }
        Some("payment") => {
            if session.payment_status.as_deref() != Some("paid") {
                tracing::info!("Checkout {} completed but not paid yet", session.id);
                return Ok(WebhookOutcome::Ignored);
            }
            let plan = resolve_plan(repo, session.line_item_price_id(), session.plan_code()).await?;
            let expires_at = plan
                .as_ref()
                .and_then(|p| p.access_days)
                .map(|days| now + Duration::days(i64::from(days)));
            let payment = repo
                .record_one_time_payment(NewOneTimePayment {
                    user_id,
                    stripe_checkout_session_id: session.id.clone(),
                    stripe_payment_intent_id: session.payment_intent.clone(),
                    plan_id: plan.as_ref().map(|p| p.id),
                    amount_cents: session
                        .amount_total
                        .or(plan.as_ref().map(|p| p.amount_cents))
                        .unwrap_or(0),
                    currency: session
                        .currency
                        .clone()
                        .or(plan.as_ref().map(|p| p.currency.clone()))
                        .unwrap_or_else(|| "brl".to_string()),
                    status: "paid".to_string(),
                    paid_at: Some(now),
                    expires_at,
                })
                .await?;
            tracing::info!("Recorded one-time payment {} for user {}", payment.id, user_id);
            Ok(WebhookOutcome::Processed)
        }
        other => {
            tracing::warn!("Checkout session {} has unexpected mode {:?}", session.id, other);
            Ok(WebhookOutcome::Ignored)
        }
    }
}

async fn resolve_session_user(
    repo: &dyn Repository,
    session: &StripeCheckoutSession,
) -> Result<Option<Uuid>, BillingError> {
    if let Some(user_id) = session.user_id() {
        if repo.user_by_id(user_id).await?.is_some() {
            return Ok(Some(user_id));
        }
    }
    match &session.customer {
        Some(customer) => Ok(repo.user_by_stripe_customer(customer).await?.map(|u| u.id)),
        None => Ok(None),
    }
}

/// Mirror a Stripe subscription into the local table.
///
/// The owner comes from `user_hint`, the subscription metadata, the stored
/// row, or the Stripe customer, in that order. Returns `None` when no owner
/// can be found.
pub async fn sync_subscription(
    repo: &dyn Repository,
    subscription: &StripeSubscription,
    user_hint: Option<Uuid>,
    plan_code_hint: Option<&str>,
) -> Result<Option<Subscription>, BillingError> {
    let existing = repo.subscription_by_stripe_id(&subscription.id).await?;

    let mut user_id = user_hint.or_else(|| subscription.metadata_user_id());
    if user_id.is_none() {
        user_id = existing.as_ref().map(|s| s.user_id);
    }
    if user_id.is_none() {
        if let Some(customer) = &subscription.customer {
            user_id = repo.user_by_stripe_customer(customer).await?.map(|u| u.id);
        }
    }
    let Some(user_id) = user_id else {
        tracing::warn!("Subscription {} has no known user", subscription.id);
        return Ok(None);
    };

    let code_hint = plan_code_hint.or_else(|| subscription.metadata.get("plan_code").map(String::as_str));
    let plan = resolve_plan(repo, subscription.price_id(), code_hint).await?;

    let stored = repo
        .upsert_subscription(SubscriptionUpsert {
            user_id,
            stripe_subscription_id: subscription.id.clone(),
            stripe_customer_id: subscription.customer.clone(),
            plan_id: plan.map(|p| p.id),
            status: subscription.status.clone(),
            current_period_end: subscription.period_end(),
            cancel_at_period_end: subscription.cancel_at_period_end,
        })
        .await?;
    tracing::info!(
        "Subscription {} for user {} is now {}",
        stored.stripe_subscription_id,
        user_id,
        stored.status
    );
    Ok(Some(stored))
}
