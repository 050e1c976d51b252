//! Authentication Handlers Module
//!
//! HTTP handlers for the `/api/auth/*` endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Request and response types
//! ├── register.rs  - User registration handler
//! ├── login.rs     - User authentication handler
//! ├── me.rs        - Get current user handler
//! ├── account.rs   - Email and password changes
//! └── recovery.rs  - Forgot / reset password
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register
//! - **`login`** - POST /api/auth/login
//! - **`get_me`** - GET /api/auth/me
//! - **`change_email`** - PUT /api/auth/email
//! - **`change_password`** - PUT /api/auth/password
//! - **`forgot_password`** - POST /api/auth/forgot-password
//! - **`reset_password`** - POST /api/auth/reset-password

/// Request and response types
pub mod types;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Get current user handler
pub mod me;

/// Email and password changes
pub mod account;

/// Password recovery
pub mod recovery;

pub use types::{AuthResponse, LoginRequest, MeResponse, RegisterRequest, UserResponse};

pub use account::{change_email, change_password};
pub use login::login;
pub use me::get_me;
pub use recovery::{forgot_password, reset_password};
pub use register::register;
