//! Billing Module
//!
//! Stripe integration: checkout and customer-portal sessions, webhook
//! processing, and the local plan/subscription/payment records the access
//! gate reads.
//!
//! # Module Structure
//!
//! ```text
//! billing/
//! ├── mod.rs        - BillingError and exports
//! ├── models.rs     - Plan, Subscription, OneTimePayment records
//! ├── provider.rs   - BillingProvider trait and Stripe object types
//! ├── stripe.rs     - StripeClient (reqwest) and DisabledBilling
//! ├── signature.rs  - Stripe-Signature verification
//! ├── webhook.rs    - Idempotent event processing
//! ├── plans.rs      - Default plan seeding
//! └── handlers.rs   - HTTP handlers
//! ```
//!
//! Stripe errors are logged in full and surface to clients as a generic 502.

use thiserror::Error;

use crate::backend::store::StoreError;

pub mod handlers;
pub mod models;
pub mod plans;
pub mod provider;
pub mod signature;
pub mod stripe;
pub mod webhook;

pub use provider::BillingProvider;
pub use stripe::{DisabledBilling, StripeClient};

#[derive(Debug, Error)]
pub enum BillingError {
    /// Missing, malformed, stale or wrong webhook signature
    #[error("invalid webhook signature: {0}")]
    Signature(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Webhook body or Stripe object that cannot be interpreted
    #[error("invalid billing payload: {0}")]
    Payload(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("HTTP error talking to Stripe: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stripe API error ({status}): {message}")]
    Api { status: u16, message: String },
}
