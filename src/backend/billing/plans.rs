//! Default plans and plan lookup.

use crate::backend::server::config::StripeConfig;
use crate::backend::store::{BillingRepository, StoreResult};

use super::models::{Plan, PlanInput, PlanKind, PLAN_ANUAL, PLAN_UNICO};

/// Plans every deployment starts with
pub fn default_plans(stripe: &StripeConfig) -> Vec<(&'static str, PlanInput)> {
    vec![
        (
            PLAN_ANUAL,
            PlanInput {
                name: "Plano Anual".to_string(),
                kind: PlanKind::Subscription,
                stripe_price_id: stripe.price_anual.clone(),
                amount_cents: 29900,
                currency: "brl".to_string(),
                access_days: None,
                active: true,
            },
        ),
        (
            PLAN_UNICO,
            PlanInput {
                name: "Pagamento Único".to_string(),
                kind: PlanKind::OneTime,
                stripe_price_id: stripe.price_unico.clone(),
                amount_cents: 34900,
                currency: "brl".to_string(),
                access_days: Some(365),
                active: true,
            },
        ),
    ]
}

/// Insert missing default plans and fill in price ids that were added to the
/// environment later. Plans edited by an admin are otherwise left alone.
pub async fn seed_default_plans<R: BillingRepository + ?Sized>(
    repo: &R,
    stripe: &StripeConfig,
) -> StoreResult<Vec<Plan>> {
    let mut seeded = Vec::new();
    for (code, input) in default_plans(stripe) {
        match repo.plan_by_code(code).await? {
            None => {
                let plan = repo.upsert_plan(code, input).await?;
                tracing::info!("Seeded plan '{}'", code);
                seeded.push(plan);
            }
            Some(existing) if existing.stripe_price_id.is_none() && input.stripe_price_id.is_some() => {
                let update = PlanInput {
                    name: existing.name.clone(),
                    kind: existing.plan_kind().unwrap_or(input.kind),
                    stripe_price_id: input.stripe_price_id,
                    amount_cents: existing.amount_cents,
                    currency: existing.currency.clone(),
                    access_days: existing.access_days,
                    active: existing.active,
                };
                let plan = repo.upsert_plan(code, update).await?;
                tracing::info!("Linked plan '{}' to its Stripe price", code);
                seeded.push(plan);
            }
            Some(_) => {}
        }
    }
    Ok(seeded)
}

/// Local plan for a Stripe price, falling back to a plan code hint
pub async fn resolve_plan<R: BillingRepository + ?Sized>(
    repo: &R,
    price_id: Option<&str>,
    code_hint: Option<&str>,
) -> StoreResult<Option<Plan>> {
    if let Some(price_id) = price_id {
        if let Some(plan) = repo.plan_by_price_id(price_id).await? {
            return Ok(Some(plan));
        }
    }
    match code_hint {
        Some(code) => repo.plan_by_code(code).await,
        None => Ok(None),
    }
}
