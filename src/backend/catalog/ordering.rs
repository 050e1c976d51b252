/**
 * Reorder Handlers
 *
 * - PUT /api/categories/order           - `{ "ids": [...] }` in display order
 * - PUT /api/categories/{id}/items/order - same, for the items of a category
 *
 * The submitted ids are checked against the caller's current siblings before
 * anything is written; a foreign id rejects the whole request with 403 and a
 * repeated id with 400. The ranks of one request are written in a single
 * transaction.
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::catalog::{ReorderRequest, ReorderResponse};
use crate::shared::ordering::plan_ranks;

pub async fn reorder_categories(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    let current: Vec<Uuid> = state
        .repo
        .list_categories(auth.user_id)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    let ranks = plan_ranks(&current, &request.ids).map_err(|e| {
        tracing::warn!(user = %auth.username, "Rejected category reorder: {}", e);
        BackendError::from(e)
    })?;
    if ranks.is_empty() {
        return Ok(Json(ReorderResponse { updated: 0 }));
    }

    state.repo.apply_category_order(auth.user_id, &ranks).await?;
    tracing::info!(user = %auth.username, updated = ranks.len(), "Categories reordered");
    Ok(Json(ReorderResponse {
        updated: ranks.len(),
    }))
}

pub async fn reorder_items(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(category_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    if state.repo.category(auth.user_id, category_id).await?.is_none() {
        return Err(BackendError::not_found("Category"));
    }

    let current: Vec<Uuid> = state
        .repo
        .list_items(auth.user_id, Some(category_id))
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();

    let ranks = plan_ranks(&current, &request.ids).map_err(|e| {
        tracing::warn!(user = %auth.username, %category_id, "Rejected item reorder: {}", e);
        BackendError::from(e)
    })?;
    if ranks.is_empty() {
        return Ok(Json(ReorderResponse { updated: 0 }));
    }

    state
        .repo
        .apply_item_order(auth.user_id, category_id, &ranks)
        .await?;
    tracing::info!(
        user = %auth.username,
        %category_id,
        updated = ranks.len(),
        "Items reordered"
    );
    Ok(Json(ReorderResponse {
        updated: ranks.len(),
    }))
}
