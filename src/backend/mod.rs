//! Backend Module
//!
//! Server-side code: the Axum HTTP API for managing a restaurant menu
//! ("cardápio"), its billing and its public page.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Registration, login, JWT tokens, password recovery
//! - **`catalog`** - Categories, items, reordering and reajuste handlers
//! - **`menu`** - Public menu and its settings
//! - **`access`** - Paid-capability decisions
//! - **`billing`** - Stripe checkout, portal and webhooks
//! - **`admin`** - User flags and plan management
//! - **`mail`** - Outgoing email
//! - **`store`** - Repository traits, PostgreSQL and in-memory stores
//! - **`maintenance`** - One-off data repair jobs
//! - **`middleware`** - Authentication and access gates
//! - **`error`** - Backend error type and HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── catalog/        - Catalog handlers
//! ├── menu/           - Public menu
//! ├── access/         - Access decisions
//! ├── billing/        - Stripe integration
//! ├── admin/          - Admin endpoints
//! ├── mail/           - Email
//! ├── store/          - Persistence
//! ├── maintenance/    - Backfill job
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! Handlers share an `AppState` of `Arc`s (store, billing provider, mailer,
//! config). Nothing is cached between requests; entitlement is re-read from
//! the store every time.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Categories, items, ordering and reajuste
pub mod catalog;

/// Public menu
pub mod menu;

/// Paid-capability decisions
pub mod access;

/// Stripe billing
pub mod billing;

/// Administrator endpoints
pub mod admin;

/// Outgoing email
pub mod mail;

/// Persistence
pub mod store;

/// Data repair jobs
pub mod maintenance;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use server::{create_app, AppState};
