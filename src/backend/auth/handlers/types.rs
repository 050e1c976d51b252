/**
 * Authentication Handler Types
 *
 * Request and response bodies for the `/api/auth/...` endpoints.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::access::AccessSummary;
use crate::backend::auth::users::User;

/// Registration request
#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    /// 3-30 chars, starts with a letter, alphanumeric + underscore
    pub username: String,
    pub email: String,
    /// At least 8 characters; hashed before storage
    pub password: String,
}

/// Login request
///
/// `username` may also hold the account email.
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Auth response
///
/// Returned by register and login. Contains the JWT token
/// and user information for immediate authentication.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    /// JWT token for authentication (30-day expiration)
    pub token: String,
    /// User information (without sensitive data)
    pub user: UserResponse,
}

/// User information that is safe to return to clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub lifetime_access: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            lifetime_access: user.lifetime_access,
        }
    }
}

/// `GET /api/auth/me`
#[derive(Serialize, Deserialize, Debug)]
pub struct MeResponse {
    pub user: UserResponse,
    pub access: AccessSummary,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChangeEmailRequest {
    pub email: String,
    pub current_password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Generic acknowledgement
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
