/**
 * Register Handler
 *
 * POST /api/auth/register
 *
 * # Registration Process
 *
 * 1. Validate username, email and password
 * 2. Hash password using bcrypt
 * 3. Create user (409 if the username or email is taken)
 * 4. Return a JWT token and the user
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::login::issue_token;
use crate::backend::auth::handlers::types::{AuthResponse, RegisterRequest};
use crate::backend::auth::users::{
    hash_password, is_valid_email, is_valid_password, is_valid_username, normalize_email,
    normalize_username, NewUser, MIN_PASSWORD_LEN,
};
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::server::state::AppState;

/// Register a new account
///
/// # Errors
///
/// * `400 Bad Request` - invalid username, email or password
/// * `409 Conflict` - username or email already in use
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let username = normalize_username(&request.username);
    let email = normalize_email(&request.email);
    tracing::info!("Register request for username: {}", username);

    if !is_valid_username(&username) {
        tracing::warn!("Invalid username format: {}", username);
        return Err(BackendError::validation(
            "username",
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }
    if !is_valid_email(&email) {
        tracing::warn!("Invalid email format: {}", email);
        return Err(BackendError::validation("email", "Invalid email format"));
    }
    if !is_valid_password(&request.password) {
        return Err(BackendError::validation(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }

    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })?;

    let user = state
        .repo
        .create_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await?;

    tracing::info!("User registered: {} ({})", user.username, user.id);
    let response = issue_token(&state, &user)?;
    Ok((StatusCode::CREATED, Json(response)))
}
