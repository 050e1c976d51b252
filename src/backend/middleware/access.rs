/**
 * Access Gate Middleware
 *
 * Runs after `auth_middleware`. Billing records are read fresh on every
 * request, so a webhook that activates or cancels a subscription takes
 * effect on the caller's next request.
 *
 * # Usage
 *
 * ```text
 * Router::new()
 *     .route("/api/reajuste/apply", post(apply))
 *     .route_layer(middleware::from_fn_with_state(state.clone(), gate_reajuste))
 * ```
 */

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::backend::access::{evaluate, AccessDecision, AccessInput, Capability};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthenticatedUser;
use crate::backend::server::state::AppState;

// Cloned out so no borrow of the (non-Sync) request body is held across an await
fn authenticated(request: &Request) -> Result<AuthenticatedUser, BackendError> {
    request.extensions().get::<AuthenticatedUser>().cloned().ok_or_else(|| {
        tracing::error!("Access gate ran without an authenticated user");
        BackendError::unauthorized("Not signed in")
    })
}

/// Reject the request with 402 unless the user may use `capability`
pub async fn require_capability(
    state: AppState,
    capability: Capability,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let user = authenticated(&request)?;
    let input = AccessInput::load(state.repo.as_ref(), &user.user).await?;

    match evaluate(&state.config.access, &input, capability) {
        AccessDecision::Granted(reason) => {
            tracing::debug!(user = %user.username, %capability, ?reason, "Access granted");
            Ok(next.run(request).await)
        }
        AccessDecision::Denied => {
            tracing::info!(user = %user.username, %capability, "Access denied, payment required");
            Err(BackendError::payment_required(format!(
                "An active plan is required to use {}",
                capability
            )))
        }
    }
}

pub async fn gate_catalog_read(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    require_capability(state, Capability::CatalogRead, request, next).await
}

pub async fn gate_catalog_write(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    require_capability(state, Capability::CatalogWrite, request, next).await
}

pub async fn gate_reajuste(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    require_capability(state, Capability::Reajuste, request, next).await
}

pub async fn gate_menu(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    require_capability(state, Capability::Menu, request, next).await
}

/// Reject non-admins with 403
pub async fn require_admin(request: Request, next: Next) -> Result<Response, BackendError> {
    let user = authenticated(&request)?;
    if !user.is_admin {
        tracing::warn!("Non-admin {} tried an admin route", user.username);
        return Err(BackendError::forbidden("Administrator access required"));
    }
    Ok(next.run(request).await)
}
