/**
 * Server Configuration
 *
 * Configuration is read from environment variables (a `.env` file is loaded
 * by the binaries before this runs), with defaults suited to local
 * development.
 *
 * # Optional Services
 *
 * - No `DATABASE_URL`: the in-memory store is used
 * - No `SMTP_HOST`: outgoing mail is only logged
 * - No `STRIPE_SECRET_KEY`: billing endpoints answer 503
 *
 * Tests build a config directly with `ServerConfig::builder()`.
 */

use std::collections::HashSet;
use std::env;
use std::sync::Arc;

use thiserror::Error;

use crate::backend::access::{AccessPolicy, Capability};
use crate::backend::store::{MemoryRepository, PgRepository, Repository};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:5173";
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
const DEV_JWT_SECRET: &str = "dev-secret-change-in-production";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is invalid: {message}")]
    Invalid { var: &'static str, message: String },
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            message: message.into(),
        }
    }
}

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

/// Stripe settings
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    /// Overridden in tests to point at a mock server
    pub api_base: String,
    /// Price backing the default `anual` plan
    pub price_anual: Option<String>,
    /// Price backing the default `unico` plan
    pub price_unico: Option<String>,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            webhook_secret: None,
            api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            price_anual: None,
            price_unico: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Frontend origin used in emailed links and checkout redirects
    pub app_base_url: String,
    pub smtp: Option<SmtpConfig>,
    pub stripe: StripeConfig,
    pub access: AccessPolicy,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read every setting from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Some(port) = var("SERVER_PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("SERVER_PORT", e.to_string()))?;
            builder = builder.port(port);
        }
        if let Some(url) = var("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        match var("JWT_SECRET") {
            Some(secret) => builder = builder.jwt_secret(secret),
            None => tracing::warn!("JWT_SECRET not set, using the development secret"),
        }
        if let Some(url) = var("APP_BASE_URL") {
            builder = builder.app_base_url(url);
        }

        if let Some(host) = var("SMTP_HOST") {
            let port = match var("SMTP_PORT") {
                Some(p) => p
                    .parse::<u16>()
                    .map_err(|e| ConfigError::invalid("SMTP_PORT", e.to_string()))?,
                None => DEFAULT_SMTP_PORT,
            };
            let from = var("SMTP_FROM")
                .ok_or_else(|| ConfigError::invalid("SMTP_FROM", "required when SMTP_HOST is set"))?;
            builder = builder.smtp(SmtpConfig {
                host,
                port,
                username: var("SMTP_USERNAME"),
                password: var("SMTP_PASSWORD"),
                from,
            });
        }

        builder = builder.stripe(StripeConfig {
            secret_key: var("STRIPE_SECRET_KEY"),
            webhook_secret: var("STRIPE_WEBHOOK_SECRET"),
            api_base: var("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string()),
            price_anual: var("STRIPE_PRICE_ANUAL"),
            price_unico: var("STRIPE_PRICE_UNICO"),
        });

        if let Some(list) = var("LIFETIME_ACCESS_USERNAMES") {
            builder = builder.lifetime_usernames(split_list(&list));
        }
        if let Some(list) = var("TRIAL_CAPABILITIES") {
            let capabilities = split_list(&list)
                .iter()
                .map(|c| {
                    c.parse::<Capability>()
                        .map_err(|e| ConfigError::invalid("TRIAL_CAPABILITIES", e))
                })
                .collect::<Result<Vec<_>, _>>()?;
            builder = builder.trial_capabilities(capabilities);
        }

        Ok(builder.build())
    }

    /// Open the configured store
    ///
    /// Falls back to the in-memory store when `DATABASE_URL` is unset.
    /// A configured database that cannot be reached is an error.
    pub async fn load_repository(&self) -> Result<Arc<dyn Repository>, crate::backend::store::StoreError> {
        match &self.database_url {
            Some(url) => {
                let repo = PgRepository::connect(url).await?;
                tracing::info!("Database connection pool created successfully");
                Ok(Arc::new(repo))
            }
            None => {
                tracing::warn!("DATABASE_URL not set. Using the in-memory store; data is lost on restart.");
                Ok(Arc::new(MemoryRepository::new()))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    port: u16,
    database_url: Option<String>,
    jwt_secret: String,
    app_base_url: String,
    smtp: Option<SmtpConfig>,
    stripe: StripeConfig,
    lifetime_usernames: Vec<String>,
    trial_capabilities: Vec<Capability>,
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            app_base_url: DEFAULT_APP_BASE_URL.to_string(),
            smtp: None,
            stripe: StripeConfig::default(),
            lifetime_usernames: Vec::new(),
            trial_capabilities: vec![Capability::CatalogRead],
        }
    }
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    pub fn app_base_url(mut self, url: impl Into<String>) -> Self {
        self.app_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn smtp(mut self, smtp: SmtpConfig) -> Self {
        self.smtp = Some(smtp);
        self
    }

    pub fn stripe(mut self, stripe: StripeConfig) -> Self {
        self.stripe = stripe;
        self
    }

    pub fn lifetime_usernames(mut self, usernames: Vec<String>) -> Self {
        self.lifetime_usernames = usernames;
        self
    }

    pub fn trial_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.trial_capabilities = capabilities;
        self
    }

    pub fn build(self) -> ServerConfig {
        let lifetime: HashSet<String> = self
            .lifetime_usernames
            .into_iter()
            .map(|u| u.to_lowercase())
            .collect();
        ServerConfig {
            port: self.port,
            database_url: self.database_url,
            jwt_secret: self.jwt_secret,
            app_base_url: self.app_base_url,
            smtp: self.smtp,
            stripe: self.stripe,
            access: AccessPolicy::new(lifetime, self.trial_capabilities.into_iter().collect()),
        }
    }
}

/// Non-empty environment variable
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
