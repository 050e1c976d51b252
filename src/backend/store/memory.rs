//! In-memory repository.
//!
//! Backs local development when no database is configured and every test
//! that does not need PostgreSQL. Data lives behind a single `RwLock`, so
//! each method is atomic on its own.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
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
use crate::shared::ordering::next_rank;
use crate::shared::{Category, Item};

#[derive(Default)]
struct MemoryData {
    users: Vec<User>,
    categories: Vec<Category>,
    items: Vec<Item>,
    plans: Vec<Plan>,
    subscriptions: Vec<Subscription>,
    payments: Vec<OneTimePayment>,
    events: HashMap<String, String>,
    menus: HashMap<Uuid, MenuSettings>,
}

impl MemoryData {
    fn user_mut(&mut self, id: Uuid) -> StoreResult<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::not_found("User"))
    }

    fn next_item_rank(&self, user_id: Uuid, category_id: Uuid) -> i32 {
        next_rank(
            self.items
                .iter()
                .filter(|i| i.user_id == user_id && i.category_id == category_id)
                .map(|i| i.sort_order),
        )
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    data: RwLock<MemoryData>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.username == new_user.username) {
            return Err(StoreError::Conflict("Username already taken".into()));
        }
        if data.users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::Conflict("Email already in use".into()));
        }
        let user = User::from_new(new_user);
        data.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.username == username).cloned())
    }

    async fn user_by_stripe_customer(&self, customer_id: &str) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| u.stripe_customer_id.as_deref() == Some(customer_id))
            .cloned())
    }

    async fn user_by_reset_token(&self, token_hash: &str) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| u.reset_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let data = self.data.read().await;
        let mut users = data.users.clone();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_email(&self, id: Uuid, email: &str) -> StoreResult<User> {
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::Conflict("Email already in use".into()));
        }
        let user = data.user_mut(id)?;
        user.email = email.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<User> {
        let mut data = self.data.write().await;
        let user = data.user_mut(id)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_stripe_customer_id(&self, id: Uuid, customer_id: &str) -> StoreResult<User> {
        let mut data = self.data.write().await;
        let user = data.user_mut(id)?;
        user.stripe_customer_id = Some(customer_id.to_string());
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_user_flags(&self, id: Uuid, flags: UserFlags) -> StoreResult<User> {
        let mut data = self.data.write().await;
        let user = data.user_mut(id)?;
        if let Some(is_admin) = flags.is_admin {
            user.is_admin = is_admin;
        }
        if let Some(lifetime) = flags.lifetime_access {
            user.lifetime_access = lifetime;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<(String, DateTime<Utc>)>,
    ) -> StoreResult<()> {
        let mut data = self.data.write().await;
        let user = data.user_mut(id)?;
        match token {
            Some((hash, expires_at)) => {
                user.reset_token_hash = Some(hash);
                user.reset_token_expires_at = Some(expires_at);
            }
            None => {
                user.reset_token_hash = None;
                user.reset_token_expires_at = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for MemoryRepository {
    async fn list_categories(&self, user_id: Uuid) -> StoreResult<Vec<Category>> {
        let data = self.data.read().await;
        let mut categories: Vec<Category> = data
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by_key(|c| (c.sort_order, c.created_at));
        Ok(categories)
    }

    async fn category(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Category>> {
        let data = self.data.read().await;
        Ok(data
            .categories
            .iter()
            .find(|c| c.id == id && c.user_id == user_id)
            .cloned())
    }

    async fn create_category(&self, user_id: Uuid, name: &str) -> StoreResult<Category> {
        let mut data = self.data.write().await;
        let siblings = data.categories.iter().filter(|c| c.user_id == user_id);
        if siblings.clone().any(|c| c.name == name) {
            return Err(StoreError::Conflict(format!("Category '{}' already exists", name)));
        }
        let sort_order = next_rank(siblings.map(|c| c.sort_order));
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            sort_order,
            created_at: now,
            updated_at: now,
        };
        data.categories.push(category.clone());
        Ok(category)
    }

    async fn rename_category(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<Category> {
        let mut data = self.data.write().await;
        if data
            .categories
            .iter()
            .any(|c| c.user_id == user_id && c.name == name && c.id != id)
        {
            return Err(StoreError::Conflict(format!("Category '{}' already exists", name)));
        }
        let category = data
            .categories
            .iter_mut()
            .find(|c| c.id == id && c.user_id == user_id)
            .ok_or_else(|| StoreError::not_found("Category"))?;
        category.name = name.to_string();
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> StoreResult<u64> {
        let mut data = self.data.write().await;
        let before = data.categories.len();
        data.categories.retain(|c| !(c.id == id && c.user_id == user_id));
        if data.categories.len() == before {
            return Err(StoreError::not_found("Category"));
        }
        let items_before = data.items.len();
        data.items.retain(|i| !(i.category_id == id && i.user_id == user_id));
        Ok((items_before - data.items.len()) as u64)
    }

    async fn apply_category_order(&self, user_id: Uuid, ranks: &[(Uuid, i32)]) -> StoreResult<()> {
        let mut data = self.data.write().await;
        let owned = ranks.iter().all(|(id, _)| {
            data.categories
                .iter()
                .any(|c| c.id == *id && c.user_id == user_id)
        });
        if !owned {
            return Err(StoreError::not_found("Category"));
        }
        let now = Utc::now();
        for (id, rank) in ranks {
            if let Some(category) = data.categories.iter_mut().find(|c| c.id == *id) {
                category.sort_order = *rank;
                category.updated_at = now;
            }
        }
        Ok(())
    }

    async fn list_items(&self, user_id: Uuid, category_id: Option<Uuid>) -> StoreResult<Vec<Item>> {
        let data = self.data.read().await;
        let category_rank: HashMap<Uuid, i32> = data
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| (c.id, c.sort_order))
            .collect();
        let mut items: Vec<Item> = data
            .items
            .iter()
            .filter(|i| i.user_id == user_id)
            .filter(|i| category_id.is_none_or(|c| i.category_id == c))
            .cloned()
            .collect();
        items.sort_by_key(|i| {
            (
                category_rank.get(&i.category_id).copied().unwrap_or(i32::MAX),
                i.sort_order,
                i.created_at,
            )
        });
        Ok(items)
    }

    async fn item(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Item>> {
        let data = self.data.read().await;
        Ok(data
            .items
            .iter()
            .find(|i| i.id == id && i.user_id == user_id)
            .cloned())
    }

    async fn create_item(&self, user_id: Uuid, new_item: NewItem) -> StoreResult<Item> {
        let mut data = self.data.write().await;
        if !data
            .categories
            .iter()
            .any(|c| c.id == new_item.category_id && c.user_id == user_id)
        {
            return Err(StoreError::not_found("Category"));
        }
        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4(),
            user_id,
            category_id: new_item.category_id,
            name: new_item.name,
            description: new_item.description,
            price: new_item.price,
            new_price: None,
            backup_price: None,
            sort_order: data.next_item_rank(user_id, new_item.category_id),
            created_at: now,
            updated_at: now,
        };
        data.items.push(item.clone());
        Ok(item)
    }

    async fn update_item(&self, user_id: Uuid, id: Uuid, changes: ItemChanges) -> StoreResult<Item> {
        let mut data = self.data.write().await;
        let current_category = data
            .items
            .iter()
            .find(|i| i.id == id && i.user_id == user_id)
            .map(|i| i.category_id)
            .ok_or_else(|| StoreError::not_found("Item"))?;

        let moved_rank = match changes.category_id {
            Some(target) if target != current_category => {
                if !data
                    .categories
                    .iter()
                    .any(|c| c.id == target && c.user_id == user_id)
                {
                    return Err(StoreError::not_found("Category"));
                }
                Some((target, data.next_item_rank(user_id, target)))
            }
            _ => None,
        };

        let item = data
            .items
            .iter_mut()
            .find(|i| i.id == id && i.user_id == user_id)
            .ok_or_else(|| StoreError::not_found("Item"))?;
        if let Some(name) = changes.name {
            item.name = name;
        }
        if let Some(description) = changes.description {
            item.description = description;
        }
        if let Some(price) = changes.price {
            item.price = price;
        }
        if let Some(new_price) = changes.new_price {
            item.new_price = new_price;
        }
        if let Some(backup_price) = changes.backup_price {
            item.backup_price = backup_price;
        }
        if let Some((category_id, rank)) = moved_rank {
            item.category_id = category_id;
            item.sort_order = rank;
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete_item(&self, user_id: Uuid, id: Uuid) -> StoreResult<()> {
        let mut data = self.data.write().await;
        let before = data.items.len();
        data.items.retain(|i| !(i.id == id && i.user_id == user_id));
        if data.items.len() == before {
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
        let mut data = self.data.write().await;
        let owned = ranks.iter().all(|(id, _)| {
            data.items
                .iter()
                .any(|i| i.id == *id && i.user_id == user_id && i.category_id == category_id)
        });
        if !owned {
            return Err(StoreError::not_found("Item"));
        }
        let now = Utc::now();
        for (id, rank) in ranks {
            if let Some(item) = data.items.iter_mut().find(|i| i.id == *id) {
                item.sort_order = *rank;
                item.updated_at = now;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BillingRepository for MemoryRepository {
    async fn list_plans(&self, active_only: bool) -> StoreResult<Vec<Plan>> {
        let data = self.data.read().await;
        let mut plans: Vec<Plan> = data
            .plans
            .iter()
            .filter(|p| !active_only || p.active)
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(plans)
    }

    async fn plan_by_code(&self, code: &str) -> StoreResult<Option<Plan>> {
        let data = self.data.read().await;
        Ok(data.plans.iter().find(|p| p.code == code).cloned())
    }

    async fn plan_by_id(&self, id: Uuid) -> StoreResult<Option<Plan>> {
        let data = self.data.read().await;
        Ok(data.plans.iter().find(|p| p.id == id).cloned())
    }

    async fn plan_by_price_id(&self, price_id: &str) -> StoreResult<Option<Plan>> {
        let data = self.data.read().await;
        Ok(data
            .plans
            .iter()
            .find(|p| p.stripe_price_id.as_deref() == Some(price_id))
            .cloned())
    }

    async fn upsert_plan(&self, code: &str, input: PlanInput) -> StoreResult<Plan> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        if let Some(plan) = data.plans.iter_mut().find(|p| p.code == code) {
            plan.name = input.name;
            plan.kind = input.kind.as_str().to_string();
            plan.stripe_price_id = input.stripe_price_id;
            plan.amount_cents = input.amount_cents;
            plan.currency = input.currency;
            plan.access_days = input.access_days;
            plan.active = input.active;
            plan.updated_at = now;
            return Ok(plan.clone());
        }
        let plan = Plan {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: input.name,
            kind: input.kind.as_str().to_string(),
            stripe_price_id: input.stripe_price_id,
            amount_cents: input.amount_cents,
            currency: input.currency,
            access_days: input.access_days,
            active: input.active,
            created_at: now,
            updated_at: now,
        };
        data.plans.push(plan.clone());
        Ok(plan)
    }

    async fn upsert_subscription(&self, upsert: SubscriptionUpsert) -> StoreResult<Subscription> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        if let Some(sub) = data
            .subscriptions
            .iter_mut()
            .find(|s| s.stripe_subscription_id == upsert.stripe_subscription_id)
        {
            sub.user_id = upsert.user_id;
            if upsert.stripe_customer_id.is_some() {
                sub.stripe_customer_id = upsert.stripe_customer_id;
            }
            if upsert.plan_id.is_some() {
                sub.plan_id = upsert.plan_id;
            }
            sub.status = upsert.status;
            sub.current_period_end = upsert.current_period_end;
            sub.cancel_at_period_end = upsert.cancel_at_period_end;
            sub.updated_at = now;
            return Ok(sub.clone());
        }
        let sub = Subscription {
            id: Uuid::new_v4(),
            user_id: upsert.user_id,
            stripe_subscription_id: upsert.stripe_subscription_id,
            stripe_customer_id: upsert.stripe_customer_id,
            plan_id: upsert.plan_id,
            status: upsert.status,
            current_period_end: upsert.current_period_end,
            cancel_at_period_end: upsert.cancel_at_period_end,
            created_at: now,
            updated_at: now,
        };
        data.subscriptions.push(sub.clone());
        Ok(sub)
    }

    async fn subscription_by_stripe_id(&self, stripe_id: &str) -> StoreResult<Option<Subscription>> {
        let data = self.data.read().await;
        Ok(data
            .subscriptions
            .iter()
            .find(|s| s.stripe_subscription_id == stripe_id)
            .cloned())
    }

    async fn update_subscription_status(
        &self,
        stripe_id: &str,
        status: &str,
        current_period_end: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Subscription>> {
        let mut data = self.data.write().await;
        Ok(data
            .subscriptions
            .iter_mut()
            .find(|s| s.stripe_subscription_id == stripe_id)
            .map(|sub| {
                sub.status = status.to_string();
                if current_period_end.is_some() {
                    sub.current_period_end = current_period_end;
                }
                sub.updated_at = Utc::now();
                sub.clone()
            }))
    }

    async fn subscriptions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>> {
        let data = self.data.read().await;
        Ok(data
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn subscriptions_missing_plan(&self) -> StoreResult<Vec<Subscription>> {
        let data = self.data.read().await;
        Ok(data
            .subscriptions
            .iter()
            .filter(|s| s.plan_id.is_none())
            .cloned()
            .collect())
    }

    async fn set_subscription_plan(&self, id: Uuid, plan_id: Uuid) -> StoreResult<()> {
        let mut data = self.data.write().await;
        let sub = data
            .subscriptions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("Subscription"))?;
        sub.plan_id = Some(plan_id);
        sub.updated_at = Utc::now();
        Ok(())
    }

    async fn record_one_time_payment(&self, payment: NewOneTimePayment) -> StoreResult<OneTimePayment> {
        let mut data = self.data.write().await;
        if let Some(existing) = data
            .payments
            .iter()
            .find(|p| p.stripe_checkout_session_id == payment.stripe_checkout_session_id)
        {
            return Ok(existing.clone());
        }
        let record = OneTimePayment {
            id: Uuid::new_v4(),
            user_id: payment.user_id,
            stripe_checkout_session_id: payment.stripe_checkout_session_id,
            stripe_payment_intent_id: payment.stripe_payment_intent_id,
            plan_id: payment.plan_id,
            amount_cents: payment.amount_cents,
            currency: payment.currency,
            status: payment.status,
            paid_at: payment.paid_at,
            expires_at: payment.expires_at,
            created_at: Utc::now(),
        };
        data.payments.push(record.clone());
        Ok(record)
    }

    async fn payments_for_user(&self, user_id: Uuid) -> StoreResult<Vec<OneTimePayment>> {
        let data = self.data.read().await;
        Ok(data
            .payments
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn payments_missing_plan(&self) -> StoreResult<Vec<OneTimePayment>> {
        let data = self.data.read().await;
        Ok(data
            .payments
            .iter()
            .filter(|p| p.plan_id.is_none())
            .cloned()
            .collect())
    }

    async fn set_payment_plan(&self, id: Uuid, plan_id: Uuid) -> StoreResult<()> {
        let mut data = self.data.write().await;
        let payment = data
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Payment"))?;
        payment.plan_id = Some(plan_id);
        Ok(())
    }

    async fn is_event_processed(&self, event_id: &str) -> StoreResult<bool> {
        let data = self.data.read().await;
        Ok(data.events.contains_key(event_id))
    }

    async fn mark_event_processed(&self, event_id: &str, event_type: &str) -> StoreResult<()> {
        let mut data = self.data.write().await;
        data.events
            .entry(event_id.to_string())
            .or_insert_with(|| event_type.to_string());
        Ok(())
    }
}

#[async_trait]
impl MenuRepository for MemoryRepository {
    async fn menu_settings(&self, user_id: Uuid) -> StoreResult<Option<MenuSettings>> {
        let data = self.data.read().await;
        Ok(data.menus.get(&user_id).cloned())
    }

    async fn save_menu_settings(
        &self,
        user_id: Uuid,
        input: MenuSettingsInput,
    ) -> StoreResult<MenuSettings> {
        let mut data = self.data.write().await;
        let settings = MenuSettings {
            user_id,
            title: input.title,
            subtitle: input.subtitle,
            footer_note: input.footer_note,
            accent_color: input.accent_color,
            show_descriptions: input.show_descriptions,
            published: input.published,
            updated_at: Utc::now(),
        };
        data.menus.insert(user_id, settings.clone());
        Ok(settings)
    }
}
