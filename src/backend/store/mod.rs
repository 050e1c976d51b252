//! Store Module
//!
//! Repository traits for everything the service persists, with two
//! implementations:
//!
//! - **`postgres`** - `PgRepository`, parameterized SQL over a `PgPool`
//! - **`memory`** - `MemoryRepository`, used when `DATABASE_URL` is unset and
//!   in tests
//!
//! Every catalog method takes the owning `user_id`; rows belonging to other
//! users behave as if they did not exist.
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs       - Traits, change sets and StoreError
//! ├── postgres.rs  - PostgreSQL implementation
//! └── memory.rs    - In-memory implementation
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::users::{NewUser, User, UserFlags};
use crate::backend::billing::models::{
    NewOneTimePayment, OneTimePayment, Plan, PlanInput, Subscription, SubscriptionUpsert,
};
use crate::backend::menu::settings::{MenuSettings, MenuSettingsInput};
use crate::shared::{Category, Item};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Repository failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row does not exist (or belongs to another user)
    #[error("{0} not found")]
    NotFound(String),

    /// A unique constraint was violated
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields for a new item
#[derive(Debug, Clone)]
pub struct NewItem {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

/// Partial item update.
///
/// `None` leaves a column unchanged; `Some(None)` clears a nullable column.
/// Changing `category_id` appends the item at the end of the target
/// category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub category_id: Option<Uuid>,
    pub new_price: Option<Option<f64>>,
    pub backup_price: Option<Option<f64>>,
}

impl ItemChanges {
    pub fn price(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username or email is taken
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;
    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn user_by_stripe_customer(&self, customer_id: &str) -> StoreResult<Option<User>>;
    async fn user_by_reset_token(&self, token_hash: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn update_email(&self, id: Uuid, email: &str) -> StoreResult<User>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<User>;
    async fn set_stripe_customer_id(&self, id: Uuid, customer_id: &str) -> StoreResult<User>;
    async fn set_user_flags(&self, id: Uuid, flags: UserFlags) -> StoreResult<User>;
    /// `None` clears any pending token
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<(String, DateTime<Utc>)>,
    ) -> StoreResult<()>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Categories in display order
    async fn list_categories(&self, user_id: Uuid) -> StoreResult<Vec<Category>>;
    async fn category(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Category>>;
    /// Appended after the user's last category
    async fn create_category(&self, user_id: Uuid, name: &str) -> StoreResult<Category>;
    async fn rename_category(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<Category>;
    /// Deletes the category and its items, returning how many items went with it
    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> StoreResult<u64>;
    /// Writes all ranks or none
    async fn apply_category_order(&self, user_id: Uuid, ranks: &[(Uuid, i32)]) -> StoreResult<()>;

    /// Items in display order, optionally limited to one category
    async fn list_items(&self, user_id: Uuid, category_id: Option<Uuid>) -> StoreResult<Vec<Item>>;
    async fn item(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Item>>;
    /// Fails with `NotFound` if the category is not the user's
    async fn create_item(&self, user_id: Uuid, new_item: NewItem) -> StoreResult<Item>;
    async fn update_item(&self, user_id: Uuid, id: Uuid, changes: ItemChanges) -> StoreResult<Item>;
    async fn delete_item(&self, user_id: Uuid, id: Uuid) -> StoreResult<()>;
    /// Writes all ranks or none
    async fn apply_item_order(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        ranks: &[(Uuid, i32)],
    ) -> StoreResult<()>;
}

#[async_trait]
pub trait BillingRepository: Send + Sync {
    async fn list_plans(&self, active_only: bool) -> StoreResult<Vec<Plan>>;
    async fn plan_by_code(&self, code: &str) -> StoreResult<Option<Plan>>;
    async fn plan_by_id(&self, id: Uuid) -> StoreResult<Option<Plan>>;
    async fn plan_by_price_id(&self, price_id: &str) -> StoreResult<Option<Plan>>;
    async fn upsert_plan(&self, code: &str, input: PlanInput) -> StoreResult<Plan>;

    /// Insert or update by `stripe_subscription_id`
    async fn upsert_subscription(&self, upsert: SubscriptionUpsert) -> StoreResult<Subscription>;
    async fn subscription_by_stripe_id(&self, stripe_id: &str) -> StoreResult<Option<Subscription>>;
    /// Returns `None` when the subscription is unknown locally
    async fn update_subscription_status(
        &self,
        stripe_id: &str,
        status: &str,
        current_period_end: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Subscription>>;
    async fn subscriptions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>>;
    async fn subscriptions_missing_plan(&self) -> StoreResult<Vec<Subscription>>;
    async fn set_subscription_plan(&self, id: Uuid, plan_id: Uuid) -> StoreResult<()>;

    /// Insert by checkout session id; an existing row is returned unchanged
    async fn record_one_time_payment(&self, payment: NewOneTimePayment) -> StoreResult<OneTimePayment>;
    async fn payments_for_user(&self, user_id: Uuid) -> StoreResult<Vec<OneTimePayment>>;
    async fn payments_missing_plan(&self) -> StoreResult<Vec<OneTimePayment>>;
    async fn set_payment_plan(&self, id: Uuid, plan_id: Uuid) -> StoreResult<()>;

    async fn is_event_processed(&self, event_id: &str) -> StoreResult<bool>;
    async fn mark_event_processed(&self, event_id: &str, event_type: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn menu_settings(&self, user_id: Uuid) -> StoreResult<Option<MenuSettings>>;
    async fn save_menu_settings(
        &self,
        user_id: Uuid,
        input: MenuSettingsInput,
    ) -> StoreResult<MenuSettings>;
}

/// Everything the service needs from storage
pub trait Repository: UserRepository + CatalogRepository + BillingRepository + MenuRepository {}

impl<T> Repository for T where T: UserRepository + CatalogRepository + BillingRepository + MenuRepository {}
