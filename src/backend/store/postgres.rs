//! PostgreSQL repository
//!
//! Runtime-checked queries over a `PgPool`. Unique violations surface as
//! `StoreError::Conflict`; order writes run in a single transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    BillingRepository, CatalogRepository, ItemChanges, MenuRepository, NewItem, StoreError,
    StoreResult, UserRepository,
};
use crate::backend::auth::users::{NewUser, User, UserFlags};
use crate::backend::billing::models::{
    NewOneTimePayment, OneTimePayment, Plan, PlanInput, Subscription, SubscriptionUpsert,
};
use crate::backend::menu::settings::{MenuSettings, MenuSettingsInput};
use crate::shared::{Category, Item};

const USER_COLUMNS: &str = "id, username, email, password_hash, is_admin, lifetime_access, \
    stripe_customer_id, reset_token_hash, reset_token_expires_at, created_at, updated_at";
const CATEGORY_COLUMNS: &str = "id, user_id, name, sort_order, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, user_id, category_id, name, description, price, new_price, \
    backup_price, sort_order, created_at, updated_at";
const PLAN_COLUMNS: &str = "id, code, name, kind, stripe_price_id, amount_cents, currency, \
    access_days, active, created_at, updated_at";
const SUBSCRIPTION_COLUMNS: &str = "id, user_id, stripe_subscription_id, stripe_customer_id, \
    plan_id, status, current_period_end, cancel_at_period_end, created_at, updated_at";
const PAYMENT_COLUMNS: &str = "id, user_id, stripe_checkout_session_id, stripe_payment_intent_id, \
    plan_id, amount_cents, currency, status, paid_at, expires_at, created_at";

/// Repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and run pending migrations
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");
        let pool = PgPool::connect(database_url).await?;
        let repo = Self::new(pool);
        repo.migrate().await?;
        Ok(repo)
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!().run(&self.pool).await?;
        tracing::info!("Database migrations completed successfully");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map unique violations to `Conflict`, everything else to `Database`
fn conflict_or(message: &str) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(message.to_string())
        }
        _ => {
            tracing::error!("Database error: {:?}", e);
            StoreError::Database(e)
        }
    }
}

fn unique_message(e: &sqlx::Error) -> Option<&'static str> {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => match db.constraint() {
            Some(c) if c.contains("email") => Some("Email already in use"),
            Some(c) if c.contains("username") => Some("Username already taken"),
            _ => Some("Already exists"),
        },
        _ => None,
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let user = User::from_new(new_user);
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match unique_message(&e) {
            Some(message) => StoreError::Conflict(message.to_string()),
            None => StoreError::Database(e),
        })?;
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn user_by_stripe_customer(&self, customer_id: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE stripe_customer_id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn user_by_reset_token(&self, token_hash: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE reset_token_hash = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn update_email(&self, id: Uuid, email: &str) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET email = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(conflict_or("Email already in use"))?
            .ok_or_else(|| StoreError::not_found("User"))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("User"))
    }

    async fn set_stripe_customer_id(&self, id: Uuid, customer_id: &str) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET stripe_customer_id = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(conflict_or("Stripe customer already linked"))?
            .ok_or_else(|| StoreError::not_found("User"))
    }

    async fn set_user_flags(&self, id: Uuid, flags: UserFlags) -> StoreResult<User> {
        let sql = format!(
            r#"
            UPDATE users
            SET is_admin = COALESCE($2, is_admin),
                lifetime_access = COALESCE($3, lifetime_access),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(flags.is_admin)
            .bind(flags.lifetime_access)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("User"))
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<(String, DateTime<Utc>)>,
    ) -> StoreResult<()> {
        let (hash, expires_at) = match token {
            Some((hash, expires_at)) => (Some(hash), Some(expires_at)),
            None => (None, None),
        };
        let result = sqlx::query(
            r#"
            UPDATE users SET reset_token_hash = $2, reset_token_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("User"));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for PgRepository {
    async fn list_categories(&self, user_id: Uuid) -> StoreResult<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = $1 ORDER BY sort_order, created_at"
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn category(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1 AND user_id = $2");
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_category(&self, user_id: Uuid, name: &str) -> StoreResult<Category> {
        let sql = format!(
            r#"
            INSERT INTO categories (id, user_id, name, sort_order)
            VALUES ($1, $2, $3,
                (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM categories WHERE user_id = $2))
            RETURNING {CATEGORY_COLUMNS}
            "#
        );
        let message = format!("Category '{}' already exists", name);
        sqlx::query_as::<_, Category>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(conflict_or(&message))
    }

    async fn rename_category(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<Category> {
        let sql = format!(
            r#"
            UPDATE categories SET name = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CATEGORY_COLUMNS}
            "#
        );
        let message = format!("Category '{}' already exists", name);
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(conflict_or(&message))?
            .ok_or_else(|| StoreError::not_found("Category"))
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let items = sqlx::query("DELETE FROM items WHERE category_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            tx.rollback().await?;
            return Err(StoreError::not_found("Category"));
        }
        tx.commit().await?;
        Ok(items)
    }

    async fn apply_category_order(&self, user_id: Uuid, ranks: &[(Uuid, i32)]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for (id, rank) in ranks {
            let result = sqlx::query(
                "UPDATE categories SET sort_order = $3, updated_at = NOW() WHERE id = $1 AND user_id = $2",
            )
            .bind(id)
            .bind(user_id)
            .bind(rank)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(StoreError::not_found("Category"));
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_items(&self, user_id: Uuid, category_id: Option<Uuid>) -> StoreResult<Vec<Item>> {
        let sql = format!(
            r#"
            SELECT {cols}
            FROM items i
            JOIN categories c ON c.id = i.category_id
            WHERE i.user_id = $1 AND ($2::uuid IS NULL OR i.category_id = $2)
            ORDER BY c.sort_order, i.sort_order, i.created_at
            "#,
            cols = prefixed(ITEM_COLUMNS, "i")
        );
        Ok(sqlx::query_as::<_, Item>(&sql)
            .bind(user_id)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn item(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 AND user_id = $2");
        Ok(sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_item(&self, user_id: Uuid, new_item: NewItem) -> StoreResult<Item> {
        if self.category(user_id, new_item.category_id).await?.is_none() {
            return Err(StoreError::not_found("Category"));
        }
        let sql = format!(
            r#"
            INSERT INTO items (id, user_id, category_id, name, description, price, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6,
                (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM items WHERE category_id = $3))
            RETURNING {ITEM_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Item>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(new_item.category_id)
            .bind(&new_item.name)
            .bind(&new_item.description)
            .bind(new_item.price)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_item(&self, user_id: Uuid, id: Uuid, changes: ItemChanges) -> StoreResult<Item> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(Uuid,)> =
            sqlx::query_as("SELECT category_id FROM items WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((current_category,)) = current else {
            return Err(StoreError::not_found("Item"));
        };

        let mut move_to: Option<(Uuid, i32)> = None;
        if let Some(target) = changes.category_id.filter(|c| *c != current_category) {
            let owned: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM categories WHERE id = $1 AND user_id = $2")
                    .bind(target)
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if owned.is_none() {
                return Err(StoreError::not_found("Category"));
            }
            let (rank,): (i32,) = sqlx::query_as(
                "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM items WHERE category_id = $1",
            )
            .bind(target)
            .fetch_one(&mut *tx)
            .await?;
            move_to = Some((target, rank));
        }

        let sql = format!(
            r#"
            UPDATE items SET
                name = COALESCE($3, name),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                price = COALESCE($6, price),
                new_price = CASE WHEN $7 THEN $8 ELSE new_price END,
                backup_price = CASE WHEN $9 THEN $10 ELSE backup_price END,
                category_id = COALESCE($11, category_id),
                sort_order = COALESCE($12, sort_order),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {ITEM_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&changes.name)
            .bind(changes.description.is_some())
            .bind(changes.description.flatten())
            .bind(changes.price)
            .bind(changes.new_price.is_some())
            .bind(changes.new_price.flatten())
            .bind(changes.backup_price.is_some())
            .bind(changes.backup_price.flatten())
            .bind(move_to.map(|(c, _)| c))
            .bind(move_to.map(|(_, r)| r))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(item)
    }

    async fn delete_item(&self, user_id: Uuid, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Item"));
        }
        Ok(())
    }

    async fn apply_item_order(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        ranks: &[(Uuid, i32)],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for (id, rank) in ranks {
            let result = sqlx::query(
                r#"
                UPDATE items SET sort_order = $4, updated_at = NOW()
                WHERE id = $1 AND user_id = $2 AND category_id = $3
                "#,
            )
            .bind(id)
            .bind(user_id)
            .bind(category_id)
            .bind(rank)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(StoreError::not_found("Item"));
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl BillingRepository for PgRepository {
    async fn list_plans(&self, active_only: bool) -> StoreResult<Vec<Plan>> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE ($1 = FALSE OR active) ORDER BY code"
        );
        Ok(sqlx::query_as::<_, Plan>(&sql)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn plan_by_code(&self, code: &str) -> StoreResult<Option<Plan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE code = $1");
        Ok(sqlx::query_as::<_, Plan>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn plan_by_id(&self, id: Uuid) -> StoreResult<Option<Plan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = $1");
        Ok(sqlx::query_as::<_, Plan>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn plan_by_price_id(&self, price_id: &str) -> StoreResult<Option<Plan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE stripe_price_id = $1 LIMIT 1");
        Ok(sqlx::query_as::<_, Plan>(&sql)
            .bind(price_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn upsert_plan(&self, code: &str, input: PlanInput) -> StoreResult<Plan> {
        let sql = format!(
            r#"
            INSERT INTO plans (id, code, name, kind, stripe_price_id, amount_cents, currency, access_days, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (code) DO UPDATE SET
                name = EXCLUDED.name,
                kind = EXCLUDED.kind,
                stripe_price_id = EXCLUDED.stripe_price_id,
                amount_cents = EXCLUDED.amount_cents,
                currency = EXCLUDED.currency,
                access_days = EXCLUDED.access_days,
                active = EXCLUDED.active,
                updated_at = NOW()
            RETURNING {PLAN_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Plan>(&sql)
            .bind(Uuid::new_v4())
            .bind(code)
            .bind(&input.name)
            .bind(input.kind.as_str())
            .bind(&input.stripe_price_id)
            .bind(input.amount_cents)
            .bind(&input.currency)
            .bind(input.access_days)
            .bind(input.active)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn upsert_subscription(&self, upsert: SubscriptionUpsert) -> StoreResult<Subscription> {
        let sql = format!(
            r#"
            INSERT INTO subscriptions (id, user_id, stripe_subscription_id, stripe_customer_id,
                plan_id, status, current_period_end, cancel_at_period_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (stripe_subscription_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                stripe_customer_id = COALESCE(EXCLUDED.stripe_customer_id, subscriptions.stripe_customer_id),
                plan_id = COALESCE(EXCLUDED.plan_id, subscriptions.plan_id),
                status = EXCLUDED.status,
                current_period_end = EXCLUDED.current_period_end,
                cancel_at_period_end = EXCLUDED.cancel_at_period_end,
                updated_at = NOW()
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Subscription>(&sql)
            .bind(Uuid::new_v4())
            .bind(upsert.user_id)
            .bind(&upsert.stripe_subscription_id)
            .bind(&upsert.stripe_customer_id)
            .bind(upsert.plan_id)
            .bind(&upsert.status)
            .bind(upsert.current_period_end)
            .bind(upsert.cancel_at_period_end)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn subscription_by_stripe_id(&self, stripe_id: &str) -> StoreResult<Option<Subscription>> {
        let sql = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE stripe_subscription_id = $1"
        );
        Ok(sqlx::query_as::<_, Subscription>(&sql)
            .bind(stripe_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_subscription_status(
        &self,
        stripe_id: &str,
        status: &str,
        current_period_end: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Subscription>> {
        let sql = format!(
            r#"
            UPDATE subscriptions
            SET status = $2,
                current_period_end = COALESCE($3, current_period_end),
                updated_at = NOW()
            WHERE stripe_subscription_id = $1
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Subscription>(&sql)
            .bind(stripe_id)
            .bind(status)
            .bind(current_period_end)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn subscriptions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>> {
        let sql = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Subscription>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn subscriptions_missing_plan(&self) -> StoreResult<Vec<Subscription>> {
        let sql = format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE plan_id IS NULL");
        Ok(sqlx::query_as::<_, Subscription>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_subscription_plan(&self, id: Uuid, plan_id: Uuid) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE subscriptions SET plan_id = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(plan_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Subscription"));
        }
        Ok(())
    }

    async fn record_one_time_payment(&self, payment: NewOneTimePayment) -> StoreResult<OneTimePayment> {
        let sql = format!(
            r#"
            INSERT INTO one_time_payments (id, user_id, stripe_checkout_session_id,
                stripe_payment_intent_id, plan_id, amount_cents, currency, status, paid_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (stripe_checkout_session_id) DO NOTHING
            RETURNING {PAYMENT_COLUMNS}
            "#
        );
        let inserted = sqlx::query_as::<_, OneTimePayment>(&sql)
            .bind(Uuid::new_v4())
            .bind(payment.user_id)
            .bind(&payment.stripe_checkout_session_id)
            .bind(&payment.stripe_payment_intent_id)
            .bind(payment.plan_id)
            .bind(payment.amount_cents)
            .bind(&payment.currency)
            .bind(&payment.status)
            .bind(payment.paid_at)
            .bind(payment.expires_at)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = inserted {
            return Ok(row);
        }
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM one_time_payments WHERE stripe_checkout_session_id = $1"
        );
        Ok(sqlx::query_as::<_, OneTimePayment>(&sql)
            .bind(&payment.stripe_checkout_session_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn payments_for_user(&self, user_id: Uuid) -> StoreResult<Vec<OneTimePayment>> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM one_time_payments WHERE user_id = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, OneTimePayment>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn payments_missing_plan(&self) -> StoreResult<Vec<OneTimePayment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM one_time_payments WHERE plan_id IS NULL");
        Ok(sqlx::query_as::<_, OneTimePayment>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_payment_plan(&self, id: Uuid, plan_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("UPDATE one_time_payments SET plan_id = $2 WHERE id = $1")
            .bind(id)
            .bind(plan_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Payment"));
        }
        Ok(())
    }

    async fn is_event_processed(&self, event_id: &str) -> StoreResult<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT event_id FROM processed_webhook_events WHERE event_id = $1")
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn mark_event_processed(&self, event_id: &str, event_type: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO processed_webhook_events (event_id, event_type)
            VALUES ($1, $2)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(event_type)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl MenuRepository for PgRepository {
    async fn menu_settings(&self, user_id: Uuid) -> StoreResult<Option<MenuSettings>> {
        Ok(sqlx::query_as::<_, MenuSettings>(
            r#"
            SELECT user_id, title, subtitle, footer_note, accent_color, show_descriptions,
                   published, updated_at
            FROM menu_settings WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn save_menu_settings(
        &self,
        user_id: Uuid,
        input: MenuSettingsInput,
    ) -> StoreResult<MenuSettings> {
        Ok(sqlx::query_as::<_, MenuSettings>(
            r#"
            INSERT INTO menu_settings (user_id, title, subtitle, footer_note, accent_color,
                show_descriptions, published, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                title = EXCLUDED.title,
                subtitle = EXCLUDED.subtitle,
                footer_note = EXCLUDED.footer_note,
                accent_color = EXCLUDED.accent_color,
                show_descriptions = EXCLUDED.show_descriptions,
                published = EXCLUDED.published,
                updated_at = NOW()
            RETURNING user_id, title, subtitle, footer_note, accent_color, show_descriptions,
                      published, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.subtitle)
        .bind(&input.footer_note)
        .bind(&input.accent_color)
        .bind(input.show_descriptions)
        .bind(input.published)
        .fetch_one(&self.pool)
        .await?)
    }
}

/// `"a, b"` with prefix `t` becomes `"t.a, t.b"`
fn prefixed(columns: &str, table: &str) -> String {
    columns
        .split(',')
        .map(|c| format!("{}.{}", table, c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
