/**
 * Plan Backfill
 *
 * Subscriptions and one-time payments recorded before plans existed have no
 * `plan_id`. Each row is resolved with one lookup against Stripe:
 *
 * - subscription: the subscription's first item price
 * - one-time payment: the checkout session's first line-item price
 *
 * and the price id is mapped to a local plan. Rows whose price matches no
 * plan are reported as unresolved and left untouched; provider or store
 * errors on a row are counted as failures and the run moves on.
 */

use serde::Serialize;
use uuid::Uuid;

use crate::backend::billing::models::{OneTimePayment, Subscription};
use crate::backend::billing::provider::BillingProvider;
use crate::backend::billing::BillingError;
use crate::backend::store::{BillingRepository, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Rows linked to a plan (or that would be, in a dry run)
    pub updated: usize,
    /// Price unknown or not mapped to any local plan
    pub unresolved: usize,
    pub failed: usize,
}

impl BackfillReport {
    fn record(&mut self, kind: &str, row: Uuid, result: Result<Option<Uuid>, BillingError>) {
        match result {
            Ok(Some(plan_id)) => {
                tracing::info!("{} {} -> plan {}", kind, row, plan_id);
                self.updated += 1;
            }
            Ok(None) => {
                tracing::warn!("{} {} has no matching plan", kind, row);
                self.unresolved += 1;
            }
            Err(e) => {
                tracing::error!("{} {} failed: {}", kind, row, e);
                self.failed += 1;
            }
        }
    }
}

/// Link every plan-less subscription and payment to its plan
///
/// With `dry_run` set nothing is written; the report counts what would
/// have been updated.
pub async fn backfill_plans<R: BillingRepository + ?Sized>(
    repo: &R,
    provider: &dyn BillingProvider,
    dry_run: bool,
) -> Result<BackfillReport, StoreError> {
    let mut report = BackfillReport::default();

    let subscriptions = repo.subscriptions_missing_plan().await?;
    tracing::info!("{} subscription(s) without a plan", subscriptions.len());
    for sub in subscriptions {
        let result = backfill_subscription(repo, provider, &sub, dry_run).await;
        report.record("Subscription", sub.id, result);
    }

    let payments = repo.payments_missing_plan().await?;
    tracing::info!("{} one-time payment(s) without a plan", payments.len());
    for payment in payments {
        let result = backfill_payment(repo, provider, &payment, dry_run).await;
        report.record("Payment", payment.id, result);
    }

    Ok(report)
}

async fn backfill_subscription<R: BillingRepository + ?Sized>(
    repo: &R,
    provider: &dyn BillingProvider,
    sub: &Subscription,
    dry_run: bool,
) -> Result<Option<Uuid>, BillingError> {
    let remote = provider.retrieve_subscription(&sub.stripe_subscription_id).await?;
    let Some(plan_id) = plan_for_price(repo, remote.price_id()).await? else {
        return Ok(None);
    };
    if !dry_run {
        repo.set_subscription_plan(sub.id, plan_id).await?;
    }
    Ok(Some(plan_id))
}

async fn backfill_payment<R: BillingRepository + ?Sized>(
    repo: &R,
    provider: &dyn BillingProvider,
    payment: &OneTimePayment,
    dry_run: bool,
) -> Result<Option<Uuid>, BillingError> {
    let session = provider
        .retrieve_checkout_session(&payment.stripe_checkout_session_id)
        .await?;
    let Some(plan_id) = plan_for_price(repo, session.line_item_price_id()).await? else {
        return Ok(None);
    };
    if !dry_run {
        repo.set_payment_plan(payment.id, plan_id).await?;
    }
    Ok(Some(plan_id))
}

async fn plan_for_price<R: BillingRepository + ?Sized>(
    repo: &R,
    price_id: Option<&str>,
) -> Result<Option<Uuid>, StoreError> {
    match price_id {
        Some(price_id) => Ok(repo.plan_by_price_id(price_id).await?.map(|plan| plan.id)),
        None => Ok(None),
    }
}
