/**
 * User Model
 *
 * The user record plus the input rules applied before a user is stored.
 * Persistence goes through `UserRepository` (see `backend::store`).
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Username (unique, 3-30 chars, alphanumeric + underscore); also the
    /// public menu slug
    pub username: String,
    /// User email address (stored lowercase)
    pub email: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Administrator flag
    pub is_admin: bool,
    /// Admin-granted lifetime access ("acesso especial")
    pub lifetime_access: bool,
    /// Stripe customer ID (set on first checkout)
    pub stripe_customer_id: Option<String>,
    /// SHA-256 of the pending password reset token
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Admin-controlled flags; `None` leaves a flag unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFlags {
    #[serde(default)]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub lifetime_access: Option<bool>,
}

impl User {
    /// Build a user record with fresh id and timestamps
    pub fn from_new(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_admin: false,
            lifetime_access: false,
            stripe_customer_id: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Names that would be shadowed by fixed menu routes
const RESERVED_USERNAMES: &[&str] = &["settings"];

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
/// - Not collide with a fixed path under `/api/menu/`
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    if RESERVED_USERNAMES.iter().any(|r| r.eq_ignore_ascii_case(username)) {
        return false;
    }

    let mut chars = username.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Basic email check: one `@` with text on both sides and a dot in the domain
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.contains('@') && !domain.starts_with('.')
        }
        None => false,
    }
}

/// Usernames double as menu slugs and are stored lowercase
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Hash a password with bcrypt at the default cost
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Constant-time check of a password against a stored hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, password_hash)
}
