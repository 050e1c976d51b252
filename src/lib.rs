// Increase recursion limit for complex async operations
#![recursion_limit = "256"]

//! Cardapio - Main Library
//!
//! Multi-tenant menu ("cardápio") price management for restaurants: each
//! user keeps a catalog of categories and items, reorders them by drag and
//! drop, adjusts prices in bulk ("reajuste") and publishes a read-only menu
//! page. Paid features are gated by Stripe subscriptions or one-time
//! payments.
//!
//! # Module Structure
//!
//! - **`shared`** - Types and pure rules shared with clients
//!   - Catalog structures, reajuste arithmetic and reports
//!   - Rank planning for reorders, BRL formatting
//!   - Error types
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP API, JWT authentication, access gate
//!   - Stripe integration and webhooks
//!   - PostgreSQL (sqlx) and in-memory stores
//!
//! # Usage
//!
//! ```rust,no_run
//! use cardapio::backend::server::{config::ServerConfig, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation and planning failures
//! - `backend::store::StoreError` for persistence
//! - `backend::BackendError` maps everything to HTTP responses

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
