//! Access Module
//!
//! Decides whether a user may use a paid capability. The decision is a pure
//! function of the user's flags, their billing records and the configured
//! policy; callers load fresh records for every request.
//!
//! Checks run in this order, first match wins:
//!
//! 1. admin flag
//! 2. lifetime access (configured username or per-user flag)
//! 3. subscription that is `active`/`trialing` and not past its period end
//! 4. one-time payment that is `paid` and not expired
//! 5. trial allow-list
//!
//! # Module Structure
//!
//! ```text
//! access/
//! └── mod.rs  - Capability, AccessPolicy, evaluate()
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::auth::users::User;
use crate::backend::billing::models::{OneTimePayment, Subscription};
use crate::backend::store::{Repository, StoreResult};

/// A gated feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "catalog:read")]
    CatalogRead,
    #[serde(rename = "catalog:write")]
    CatalogWrite,
    #[serde(rename = "reajuste")]
    Reajuste,
    #[serde(rename = "menu")]
    Menu,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::CatalogRead,
        Capability::CatalogWrite,
        Capability::Reajuste,
        Capability::Menu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CatalogRead => "catalog:read",
            Self::CatalogWrite => "catalog:write",
            Self::Reajuste => "reajuste",
            Self::Menu => "menu",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown capability '{}'", s))
    }
}

/// Why access was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    Admin,
    Lifetime,
    Subscription,
    OneTimePayment,
    Trial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(AccessReason),
    Denied,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Deployment-wide access rules
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    /// Lowercased usernames with permanent access
    lifetime_usernames: HashSet<String>,
    /// Capabilities available without payment
    trial: HashSet<Capability>,
}

impl AccessPolicy {
    pub fn new(lifetime_usernames: HashSet<String>, trial: HashSet<Capability>) -> Self {
        Self {
            lifetime_usernames,
            trial,
        }
    }

    pub fn is_lifetime_username(&self, username: &str) -> bool {
        self.lifetime_usernames.contains(&username.to_lowercase())
    }

    pub fn trial_allows(&self, capability: Capability) -> bool {
        self.trial.contains(&capability)
    }
}

/// Everything the decision looks at for one user
#[derive(Debug, Clone)]
pub struct AccessInput {
    pub username: String,
    pub is_admin: bool,
    pub lifetime_access: bool,
    pub subscriptions: Vec<Subscription>,
    pub payments: Vec<OneTimePayment>,
    pub now: DateTime<Utc>,
}

impl AccessInput {
    /// Read the user's current billing records
    pub async fn load(repo: &dyn Repository, user: &User) -> StoreResult<Self> {
        Ok(Self {
            username: user.username.clone(),
            is_admin: user.is_admin,
            lifetime_access: user.lifetime_access,
            subscriptions: repo.subscriptions_for_user(user.id).await?,
            payments: repo.payments_for_user(user.id).await?,
            now: Utc::now(),
        })
    }
}

/// Paid-access reason, ignoring the trial list
fn paid_reason(policy: &AccessPolicy, input: &AccessInput) -> Option<AccessReason> {
    if input.is_admin {
        return Some(AccessReason::Admin);
    }
    if input.lifetime_access || policy.is_lifetime_username(&input.username) {
        return Some(AccessReason::Lifetime);
    }
    if input.subscriptions.iter().any(|s| s.grants_access(input.now)) {
        return Some(AccessReason::Subscription);
    }
    if input.payments.iter().any(|p| p.grants_access(input.now)) {
        return Some(AccessReason::OneTimePayment);
    }
    None
}

/// Decide whether `input` may use `capability`
pub fn evaluate(policy: &AccessPolicy, input: &AccessInput, capability: Capability) -> AccessDecision {
    match paid_reason(policy, input) {
        Some(reason) => AccessDecision::Granted(reason),
        None if policy.trial_allows(capability) => AccessDecision::Granted(AccessReason::Trial),
        None => AccessDecision::Denied,
    }
}

/// Access overview returned by `/api/auth/me` and the admin user list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessSummary {
    pub has_paid_access: bool,
    pub reason: Option<AccessReason>,
    pub capabilities: Vec<Capability>,
}

pub fn summarize(policy: &AccessPolicy, input: &AccessInput) -> AccessSummary {
    let reason = paid_reason(policy, input);
    let capabilities = Capability::ALL
        .into_iter()
        .filter(|c| evaluate(policy, input, *c).is_granted())
        .collect();
    AccessSummary {
        has_paid_access: reason.is_some(),
        reason,
        capabilities,
    }
}
