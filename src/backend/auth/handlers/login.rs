/**
 * Login Handler
 *
 * POST /api/auth/login
 *
 * # Authentication Process
 *
 * 1. Look up the user by username, or by email when the identifier has an `@`
 * 2. Verify password using bcrypt
 * 3. Generate JWT token
 * 4. Return token and user info
 *
 * # Security
 *
 * - Unknown user and wrong password both return 401 with the same message
 * - JWT tokens are generated with 30-day expiration
 * - User passwords are never returned in responses
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest, UserResponse};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{normalize_email, normalize_username, verify_password, User};
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::server::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Login handler
///
/// # Example Request
///
/// ```http
/// POST /api/auth/login HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "username": "cantina",
///   "password": "securepassword123"
/// }
/// ```
///
/// # Example Response
///
/// ```json
/// {
///   "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///   "user": {
///     "id": "123e4567-e89b-12d3-a456-426614174000",
///     "username": "cantina",
///     "email": "dono@cantina.com.br",
///     "is_admin": false,
///     "lifetime_access": false
///   }
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let identifier = request.username.trim();
    tracing::info!("Login request for: {}", identifier);

    let user = if identifier.contains('@') {
        state.repo.user_by_email(&normalize_email(identifier)).await?
    } else {
        state.repo.user_by_username(&normalize_username(identifier)).await?
    };

    let user = user.ok_or_else(|| {
        tracing::warn!("User not found: {}", identifier);
        BackendError::unauthorized(INVALID_CREDENTIALS)
    })?;

    let valid = verify_password(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification error: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })?;

    if !valid {
        tracing::warn!("Invalid password for user: {}", user.username);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    tracing::info!("User logged in: {}", user.username);
    Ok(Json(issue_token(&state, &user)?))
}

/// Sign a token for `user` and wrap it with the public user fields
pub(crate) fn issue_token(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    let token = create_token(&state.config.jwt_secret, user.id, &user.email, &user.username)
        .map_err(|e| {
            tracing::error!("Failed to create token: {:?}", e);
            BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        })?;

    Ok(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
}
