//! Middleware Module
//!
//! Request processing that runs before handlers.
//!
//! - **`auth`** - bearer token verification; attaches `AuthenticatedUser`
//! - **`access`** - paid-capability gate (402) and admin gate (403)
//!
//! Layer order matters: `auth` must wrap `access`.

pub mod access;
pub mod auth;

pub use access::{
    gate_catalog_read, gate_catalog_write, gate_menu, gate_reajuste, require_admin,
    require_capability,
};
pub use auth::{auth_middleware, extract_authenticated_user, AuthUser, AuthenticatedUser};
