/**
 * Get Current User Handler
 *
 * GET /api/auth/me
 *
 * Returns the signed-in user and an access summary computed from their
 * current billing records.
 */

use axum::{extract::State, response::Json};

use crate::backend::access::{summarize, AccessInput};
use crate::backend::auth::handlers::types::{MeResponse, UserResponse};
use crate::backend::error::ApiResult;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;

pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<MeResponse>> {
    let input = AccessInput::load(state.repo.as_ref(), &auth.user).await?;

    Ok(Json(MeResponse {
        user: UserResponse::from(&auth.user),
        access: summarize(&state.config.access, &input),
    }))
}
