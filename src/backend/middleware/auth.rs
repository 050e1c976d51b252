/**
 * Authentication Middleware
 *
 * Protects routes that require a signed-in user. The bearer token is
 * verified, the user is loaded from the store (so deleted users lose access
 * immediately) and attached to the request extensions for handlers and the
 * access gate.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::auth::users::User;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    /// Full record as loaded for this request
    pub user: User,
}

/// Authentication middleware
///
/// 1. Extracts the token from `Authorization: Bearer <token>`
/// 2. Verifies it with the configured secret
/// 3. Loads the user
/// 4. Inserts `AuthenticatedUser` into the request extensions
///
/// Returns 401 Unauthorized if any step fails
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let user_id = bearer_user_id(&app_state.config.jwt_secret, &request)?;

    let user = app_state.repo.user_by_id(user_id).await?.ok_or_else(|| {
        tracing::warn!("Token for unknown user {}", user_id);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin,
        user,
    });

    Ok(next.run(request).await)
}

/// Verify the bearer token and return the user id it was issued for
fn bearer_user_id(secret: &str, request: &Request) -> Result<Uuid, BackendError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            BackendError::unauthorized("Missing Authorization header")
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid Authorization header format");
        BackendError::unauthorized("Invalid Authorization header")
    })?;

    let claims = verify_token(secret, token).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    Uuid::parse_str(&claims.sub).map_err(|e| {
        tracing::warn!("Invalid user ID in token: {:?}", e);
        BackendError::unauthorized("Invalid or expired token")
    })
}

/// Extract authenticated user from request extensions
pub fn extract_authenticated_user(parts: &Parts) -> Result<AuthenticatedUser, BackendError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| {
            tracing::warn!("AuthenticatedUser not found in request extensions");
            BackendError::unauthorized("Not signed in")
        })
}

/// Axum extractor for the user set by [`auth_middleware`]
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_authenticated_user(parts).map(AuthUser)
    }
}
