//! Admin Module
//!
//! Administrator-only endpoints (`is_admin`), mounted behind
//! `require_admin`:
//!
//! - GET   /api/admin/users        - every user with an access summary
//! - PATCH /api/admin/users/{id}   - set `is_admin` / `lifetime_access`
//! - GET   /api/admin/plans        - all plans, inactive included
//! - PUT   /api/admin/plans/{code} - create or update a plan

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::access::{summarize, AccessInput, AccessSummary};
use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::users::UserFlags;
use crate::backend::billing::models::{Plan, PlanInput, PlanKind};
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(flatten)]
    pub user: UserResponse,
    pub stripe_customer_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub access: AccessSummary,
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<AdminUser>>> {
    let users = state.repo.list_users().await?;
    let mut listed = Vec::with_capacity(users.len());
    for user in users {
        let input = AccessInput::load(state.repo.as_ref(), &user).await?;
        listed.push(AdminUser {
            user: UserResponse::from(&user),
            stripe_customer_id: user.stripe_customer_id.clone(),
            created_at: user.created_at,
            access: summarize(&state.config.access, &input),
        });
    }
    Ok(Json(listed))
}

pub async fn update_user_flags(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    Path(id): Path<Uuid>,
    Json(flags): Json<UserFlags>,
) -> ApiResult<Json<UserResponse>> {
    if id == admin.user_id && flags.is_admin == Some(false) {
        return Err(BackendError::validation(
            "is_admin",
            "Administrators cannot remove their own admin flag",
        ));
    }

    let user = state.repo.set_user_flags(id, flags.clone()).await?;
    tracing::info!(
        admin = %admin.username,
        target = %user.username,
        is_admin = ?flags.is_admin,
        lifetime_access = ?flags.lifetime_access,
        "User flags updated"
    );
    Ok(Json(UserResponse::from(&user)))
}

pub async fn list_plans(State(state): State<AppState>) -> ApiResult<Json<Vec<Plan>>> {
    Ok(Json(state.repo.list_plans(false).await?))
}

fn validate_plan(code: &str, input: &mut PlanInput) -> ApiResult<()> {
    let valid_code = !code.is_empty()
        && code.len() <= 40
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid_code {
        return Err(BackendError::validation(
            "code",
            "Plan code must be lowercase letters, digits, '-' or '_'",
        ));
    }

    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(BackendError::validation("name", "Plan name cannot be empty"));
    }
    if input.amount_cents < 0 {
        return Err(BackendError::validation("amount_cents", "Amount cannot be negative"));
    }
    input.currency = input.currency.trim().to_lowercase();
    if input.currency.len() != 3 {
        return Err(BackendError::validation("currency", "Currency must be a 3-letter code"));
    }
    match (input.kind, input.access_days) {
        (PlanKind::Subscription, Some(_)) => {
            return Err(BackendError::validation(
                "access_days",
                "Subscription plans cannot set access_days",
            ))
        }
        (PlanKind::OneTime, Some(days)) if days <= 0 => {
            return Err(BackendError::validation("access_days", "access_days must be positive"))
        }
        _ => {}
    }
    input.stripe_price_id = input
        .stripe_price_id
        .take()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    Ok(())
}

pub async fn upsert_plan(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    Path(code): Path<String>,
    Json(mut input): Json<PlanInput>,
) -> ApiResult<Json<Plan>> {
    validate_plan(&code, &mut input)?;
    let plan = state.repo.upsert_plan(&code, input).await?;
    tracing::info!(admin = %admin.username, plan = %plan.code, "Plan saved");
    Ok(Json(plan))
}
