/**
 * Application State Management
 *
 * `AppState` is the central state container handed to every handler. It only
 * holds `Arc`s, so cloning it per request is cheap, and it carries no
 * request-spanning mutable state of its own.
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract just the part they
 * need, e.g. `State(repo): State<Arc<dyn Repository>>`.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::billing::{BillingProvider, DisabledBilling, StripeClient};
use crate::backend::mail::{LogMailer, Mailer, SmtpMailer};
use crate::backend::server::config::ServerConfig;
use crate::backend::store::Repository;

#[derive(Clone)]
pub struct AppState {
    /// Users, catalog, billing records and menu settings
    pub repo: Arc<dyn Repository>,
    /// Stripe, or `DisabledBilling` when no key is configured
    pub billing: Arc<dyn BillingProvider>,
    /// SMTP, or `LogMailer` when SMTP is not configured
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        repo: Arc<dyn Repository>,
        billing: Arc<dyn BillingProvider>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            repo,
            billing,
            mailer,
            config: Arc::new(config),
        }
    }

    /// Build providers from the config; only the store is passed in
    pub fn from_config(config: ServerConfig, repo: Arc<dyn Repository>) -> Self {
        let billing: Arc<dyn BillingProvider> = match StripeClient::from_config(&config.stripe) {
            Some(client) => Arc::new(client),
            None => {
                tracing::warn!("STRIPE_SECRET_KEY not set. Billing endpoints will answer 503.");
                Arc::new(DisabledBilling)
            }
        };

        let mailer: Arc<dyn Mailer> = match config.smtp.as_ref().map(SmtpMailer::new) {
            Some(Ok(mailer)) => Arc::new(mailer),
            Some(Err(e)) => {
                tracing::error!("Failed to set up SMTP, emails will only be logged: {}", e);
                Arc::new(LogMailer)
            }
            None => {
                tracing::warn!("SMTP_HOST not set. Emails will only be logged.");
                Arc::new(LogMailer)
            }
        };

        Self::new(config, repo, billing, mailer)
    }
}

impl FromRef<AppState> for Arc<dyn Repository> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for Arc<dyn BillingProvider> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.billing.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Mailer> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.mailer.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
