//! Authentication Module
//!
//! User accounts, JWT sessions and password recovery.
//!
//! # Architecture
//!
//! - **`users`** - User model, input rules and password hashing
//! - **`sessions`** - JWT token generation and validation
//! - **`recovery`** - Password reset tokens
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and validation
//! ├── sessions.rs     - JWT token management
//! ├── recovery.rs     - Reset token generation and hashing
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - JWT tokens are used for stateless authentication and expire after 30 days
//! - Invalid credentials return 401 (no information leakage)
//! - Only the SHA-256 of a reset token is stored

/// User data model and validation
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// Password reset tokens
pub mod recovery;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
