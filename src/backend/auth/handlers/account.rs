/**
 * Account Handlers
 *
 * - PUT /api/auth/email    - change email
 * - PUT /api/auth/password - change password
 *
 * Both require the current password. Changing the email returns a fresh
 * token, since the old one carries the old address.
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::login::issue_token;
use crate::backend::auth::handlers::types::{
    AuthResponse, ChangeEmailRequest, ChangePasswordRequest, MessageResponse,
};
use crate::backend::auth::users::{
    hash_password, is_valid_email, is_valid_password, normalize_email, verify_password, User,
    MIN_PASSWORD_LEN,
};
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;

fn check_current_password(user: &User, password: &str) -> ApiResult<()> {
    let valid = verify_password(password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification error: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })?;
    if !valid {
        tracing::warn!("Wrong current password for user: {}", user.username);
        return Err(BackendError::forbidden("Current password is incorrect"));
    }
    Ok(())
}

pub async fn change_email(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<ChangeEmailRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = normalize_email(&request.email);
    if !is_valid_email(&email) {
        return Err(BackendError::validation("email", "Invalid email format"));
    }
    check_current_password(&auth.user, &request.current_password)?;

    let user = state.repo.update_email(auth.user_id, &email).await?;
    tracing::info!("User {} changed email", user.username);
    Ok(Json(issue_token(&state, &user)?))
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if !is_valid_password(&request.new_password) {
        return Err(BackendError::validation(
            "new_password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    check_current_password(&auth.user, &request.current_password)?;

    let password_hash = hash_password(&request.new_password).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })?;
    state.repo.update_password(auth.user_id, &password_hash).await?;

    tracing::info!("User {} changed password", auth.username);
    Ok(Json(MessageResponse::new("Password updated")))
}
