/**
 * Catalog Data Structures
 *
 * Categories and items as stored and as sent over the JSON API, plus the
 * request bodies the catalog endpoints accept.
 *
 * A client keeps a `CatalogSnapshot` as its single store object and
 * replaces it with the server's answer after each mutation.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::pricing::validate_price;

pub const CATEGORY_NAME_MAX: usize = 80;
pub const ITEM_NAME_MAX: usize = 120;
pub const ITEM_DESCRIPTION_MAX: usize = 500;

/// A user's category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Unique per user
    pub name: String,
    /// Display rank among the user's categories
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A priced item inside a category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Item {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Current price
    pub price: f64,
    /// Staged price from a reajuste preview, waiting for confirmation
    pub new_price: Option<f64>,
    /// Snapshot taken by an explicit backup, used by restore
    pub backup_price: Option<f64>,
    /// Display rank inside the category
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with its items in display order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryWithItems {
    #[serde(flatten)]
    pub category: Category,
    pub items: Vec<Item>,
}

/// Everything a user owns, in display order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CatalogSnapshot {
    pub categories: Vec<CategoryWithItems>,
}

impl CatalogSnapshot {
    /// Group items under their categories. Both inputs may be in any order.
    pub fn assemble(mut categories: Vec<Category>, mut items: Vec<Item>) -> Self {
        categories.sort_by_key(|c| (c.sort_order, c.created_at));
        items.sort_by_key(|i| (i.sort_order, i.created_at));
        let categories = categories
            .into_iter()
            .map(|category| {
                let items = items
                    .iter()
                    .filter(|i| i.category_id == category.id)
                    .cloned()
                    .collect();
                CategoryWithItems { category, items }
            })
            .collect();
        Self { categories }
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub category_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
}

/// Partial item update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Stage a new price by hand
    #[serde(default)]
    pub new_price: Option<f64>,
    /// Drop any staged price
    #[serde(default)]
    pub clear_new_price: bool,
}

/// Final visual order of a sibling list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderResponse {
    pub updated: usize,
}

/// Trim and validate a category name
pub fn normalize_category_name(name: &str) -> Result<String, SharedError> {
    normalize_name("name", name, CATEGORY_NAME_MAX)
}

/// Trim and validate an item name
pub fn normalize_item_name(name: &str) -> Result<String, SharedError> {
    normalize_name("name", name, ITEM_NAME_MAX)
}

/// Trim a description; blank becomes `None`
pub fn normalize_description(description: Option<&str>) -> Result<Option<String>, SharedError> {
    match description.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > ITEM_DESCRIPTION_MAX => Err(SharedError::validation(
            "description",
            format!("Description must be at most {} characters", ITEM_DESCRIPTION_MAX),
        )),
        Some(text) => Ok(Some(text.to_string())),
    }
}

fn normalize_name(field: &str, name: &str, max: usize) -> Result<String, SharedError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SharedError::validation(field, "Name cannot be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(SharedError::validation(
            field,
            format!("Name must be at most {} characters", max),
        ));
    }
    Ok(trimmed.to_string())
}

impl CreateItemRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        normalize_item_name(&self.name)?;
        normalize_description(self.description.as_deref())?;
        validate_price("price", self.price)
    }
}

impl UpdateItemRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        if let Some(name) = &self.name {
            normalize_item_name(name)?;
        }
        normalize_description(self.description.as_deref())?;
        if let Some(price) = self.price {
            validate_price("price", price)?;
        }
        if let Some(new_price) = self.new_price {
            validate_price("new_price", new_price)?;
        }
        if self.clear_new_price && self.new_price.is_some() {
            return Err(SharedError::validation(
                "new_price",
                "Cannot stage and clear a new price in the same request",
            ));
        }
        Ok(())
    }
}
