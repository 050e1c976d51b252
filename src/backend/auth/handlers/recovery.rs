/**
 * Password Recovery Handlers
 *
 * - POST /api/auth/forgot-password - email a reset link
 * - POST /api/auth/reset-password  - set a new password with the emailed token
 *
 * `forgot-password` answers the same way whether or not the email exists,
 * and a mail delivery failure is logged rather than reported.
 *
 * This is the one mail path that does not surface an external error as
 * 502: only registered addresses reach the mailer, so a failure status
 * would reveal which emails have accounts.
 */

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;

use crate::backend::auth::handlers::types::{
    ForgotPasswordRequest, MessageResponse, ResetPasswordRequest,
};
use crate::backend::auth::recovery::{generate_reset_token, hash_reset_token, reset_token_expiry};
use crate::backend::auth::users::{
    hash_password, is_valid_password, normalize_email, MIN_PASSWORD_LEN,
};
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::mail::password_reset_mail;
use crate::backend::server::state::AppState;

const FORGOT_ACK: &str = "If the email is registered, a reset link has been sent";
const INVALID_TOKEN: &str = "Invalid or expired reset token";

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = normalize_email(&request.email);

    let Some(user) = state.repo.user_by_email(&email).await? else {
        tracing::info!("Password reset requested for unknown email");
        return Ok(Json(MessageResponse::new(FORGOT_ACK)));
    };

    let token = generate_reset_token();
    let expires_at = reset_token_expiry(Utc::now());
    state
        .repo
        .set_reset_token(user.id, Some((hash_reset_token(&token), expires_at)))
        .await?;

    let mail = password_reset_mail(&user.email, &state.config.app_base_url, &token);
    match state.mailer.send(mail).await {
        Ok(()) => tracing::info!("Password reset email sent to user {}", user.id),
        Err(e) => tracing::error!("Failed to send password reset email to user {}: {}", user.id, e),
    }

    Ok(Json(MessageResponse::new(FORGOT_ACK)))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if !is_valid_password(&request.new_password) {
        return Err(BackendError::validation(
            "new_password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }

    let token = request.token.trim();
    if token.is_empty() {
        return Err(BackendError::handler(StatusCode::BAD_REQUEST, INVALID_TOKEN));
    }

    let user = state
        .repo
        .user_by_reset_token(&hash_reset_token(token))
        .await?
        .ok_or_else(|| {
            tracing::warn!("Password reset with unknown token");
            BackendError::handler(StatusCode::BAD_REQUEST, INVALID_TOKEN)
        })?;

    if user.reset_token_expires_at.is_none_or(|at| at <= Utc::now()) {
        tracing::warn!("Expired reset token for user {}", user.id);
        state.repo.set_reset_token(user.id, None).await?;
        return Err(BackendError::handler(StatusCode::BAD_REQUEST, INVALID_TOKEN));
    }

    let password_hash = hash_password(&request.new_password).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })?;
    state.repo.update_password(user.id, &password_hash).await?;
    state.repo.set_reset_token(user.id, None).await?;

    tracing::info!("Password reset for user {}", user.id);
    Ok(Json(MessageResponse::new("Password updated")))
}
