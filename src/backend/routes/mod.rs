//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, static files, layers
//! └── api_routes.rs   - `/api/*` endpoints grouped by middleware
//! ```
//!
//! # Route Types
//!
//! ## Public
//!
//! - `POST /api/auth/register`, `/api/auth/login`
//! - `POST /api/auth/forgot-password`, `/api/auth/reset-password`
//! - `GET /api/billing/plans`, `POST /api/billing/webhook`
//! - `GET /api/menu/{username}`
//!
//! ## Signed in
//!
//! - `GET /api/auth/me`, `PUT /api/auth/email`, `PUT /api/auth/password`
//! - `POST /api/billing/checkout`, `POST /api/billing/portal`,
//!   `GET /api/billing/status`
//!
//! ## Signed in and paid (or trial-allowed)
//!
//! - catalog: `/api/categories/*`, `/api/items/*`
//! - reajuste: `/api/reajuste/*`, `/api/items/backup`, `/api/items/restore`
//! - menu: `/api/menu/settings`
//!
//! ## Admin
//!
//! - `/api/admin/users`, `/api/admin/users/{id}`
//! - `/api/admin/plans`, `/api/admin/plans/{code}`

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
