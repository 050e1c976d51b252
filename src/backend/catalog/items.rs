/**
 * Item Handlers
 *
 * - GET    /api/items?category_id= - items in display order
 * - POST   /api/items              - create (appended last in its category)
 * - PUT    /api/items/{id}         - partial update, including moves
 * - DELETE /api/items/{id}
 *
 * Items of other users answer 404, exactly like missing ones.
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{ItemChanges, NewItem};
use crate::shared::catalog::{
    normalize_description, normalize_item_name, CreateItemRequest, UpdateItemRequest,
};
use crate::shared::Item;

#[derive(Debug, Default, Deserialize)]
pub struct ItemFilter {
    pub category_id: Option<Uuid>,
}

pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Query(filter): Query<ItemFilter>,
) -> ApiResult<Json<Vec<Item>>> {
    if let Some(category_id) = filter.category_id {
        if state.repo.category(auth.user_id, category_id).await?.is_none() {
            return Err(BackendError::not_found("Category"));
        }
    }
    let items = state.repo.list_items(auth.user_id, filter.category_id).await?;
    Ok(Json(items))
}

pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreateItemRequest>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    request.validate()?;
    let new_item = NewItem {
        category_id: request.category_id,
        name: normalize_item_name(&request.name)?,
        description: normalize_description(request.description.as_deref())?,
        price: request.price,
    };

    let item = state.repo.create_item(auth.user_id, new_item).await?;
    tracing::info!(user = %auth.username, item_id = %item.id, "Item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Turn a validated update body into a store change set
pub fn item_changes(request: UpdateItemRequest) -> ApiResult<ItemChanges> {
    request.validate()?;

    let name = request
        .name
        .as_deref()
        .map(normalize_item_name)
        .transpose()?;
    // A present but blank description clears it
    let description = match request.description.as_deref() {
        Some(text) => Some(normalize_description(Some(text))?),
        None => None,
    };
    let new_price = if request.clear_new_price {
        Some(None)
    } else {
        request.new_price.map(Some)
    };

    Ok(ItemChanges {
        name,
        description,
        price: request.price,
        category_id: request.category_id,
        new_price,
        backup_price: None,
    })
}

pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateItemRequest>,
) -> ApiResult<Json<Item>> {
    let changes = item_changes(request)?;
    let item = state.repo.update_item(auth.user_id, id, changes).await?;
    tracing::info!(user = %auth.username, item_id = %id, "Item updated");
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.repo.delete_item(auth.user_id, id).await?;
    tracing::info!(user = %auth.username, item_id = %id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}
