/**
 * Category Handlers
 *
 * - GET    /api/categories      - full catalog in display order
 * - POST   /api/categories      - create (appended last)
 * - PUT    /api/categories/{id} - rename
 * - DELETE /api/categories/{id} - delete with its items
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::ApiResult;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::catalog::{normalize_category_name, CategoryRequest};
use crate::shared::{CatalogSnapshot, Category};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteCategoryResponse {
    pub deleted_items: u64,
}

/// Categories with their items, both in display order
pub async fn list_catalog(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<CatalogSnapshot>> {
    let categories = state.repo.list_categories(auth.user_id).await?;
    let items = state.repo.list_items(auth.user_id, None).await?;
    Ok(Json(CatalogSnapshot::assemble(categories, items)))
}

pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let name = normalize_category_name(&request.name)?;
    let category = state.repo.create_category(auth.user_id, &name).await?;
    tracing::info!(user = %auth.username, category_id = %category.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn rename_category(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<Json<Category>> {
    let name = normalize_category_name(&request.name)?;
    let category = state.repo.rename_category(auth.user_id, id, &name).await?;
    tracing::info!(user = %auth.username, category_id = %id, "Category renamed");
    Ok(Json(category))
}

/// Deletes the category and every item in it
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteCategoryResponse>> {
    let deleted_items = state.repo.delete_category(auth.user_id, id).await?;
    tracing::info!(
        user = %auth.username,
        category_id = %id,
        deleted_items,
        "Category deleted"
    );
    Ok(Json(DeleteCategoryResponse { deleted_items }))
}
