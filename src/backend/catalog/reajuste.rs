/**
 * Reajuste Handlers
 *
 * - POST /api/reajuste/preview - stage adjusted prices in `new_price`
 * - POST /api/reajuste/confirm - promote staged prices to `price`
 * - POST /api/reajuste/discard - drop staged prices
 * - POST /api/reajuste/apply   - compute and write `price` in one step
 * - POST /api/items/backup     - copy `price` into `backup_price`
 * - POST /api/items/restore    - copy `backup_price` back into `price`
 *
 * Every operation walks the selection in order and writes each item on its
 * own. The response reports succeeded, failed and skipped items; items
 * already written stay written when a later one fails.
 */

use axum::{extract::State, response::Json};
use uuid::Uuid;

use crate::backend::error::ApiResult;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{ItemChanges, Repository};
use crate::shared::pricing::Adjustment;
use crate::shared::reajuste::{
    validate_selection, ItemOutcome, ItemSelection, ReajusteReport, ReajusteRequest,
};
use crate::shared::{Item, SkipReason};

/// One bulk operation, applied item by item
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceOperation {
    Preview(Adjustment),
    Apply(Adjustment),
    Confirm,
    Discard,
    Backup,
    Restore,
}

impl PriceOperation {
    fn name(&self) -> &'static str {
        match self {
            Self::Preview(_) => "preview",
            Self::Apply(_) => "apply",
            Self::Confirm => "confirm",
            Self::Discard => "discard",
            Self::Backup => "backup",
            Self::Restore => "restore",
        }
    }

    /// Change set for `item` and the price value to report
    pub fn plan(&self, item: &Item) -> Result<(ItemChanges, Option<f64>), SkipReason> {
        match *self {
            Self::Preview(adjustment) => {
                let staged = adjustment.apply(item.price)?;
                let changes = ItemChanges {
                    new_price: Some(Some(staged)),
                    ..Default::default()
                };
                Ok((changes, Some(staged)))
            }
            Self::Apply(adjustment) => {
                let price = adjustment.apply(item.price)?;
                let changes = ItemChanges {
                    new_price: Some(None),
                    ..ItemChanges::price(price)
                };
                Ok((changes, Some(price)))
            }
            Self::Confirm => {
                let staged = item.new_price.ok_or(SkipReason::NothingStaged)?;
                let changes = ItemChanges {
                    new_price: Some(None),
                    ..ItemChanges::price(staged)
                };
                Ok((changes, Some(staged)))
            }
            Self::Discard => {
                item.new_price.ok_or(SkipReason::NothingStaged)?;
                let changes = ItemChanges {
                    new_price: Some(None),
                    ..Default::default()
                };
                Ok((changes, None))
            }
            Self::Backup => {
                let changes = ItemChanges {
                    backup_price: Some(Some(item.price)),
                    ..Default::default()
                };
                Ok((changes, Some(item.price)))
            }
            Self::Restore => {
                let backup = item.backup_price.ok_or(SkipReason::NoBackup)?;
                Ok((ItemChanges::price(backup), Some(backup)))
            }
        }
    }
}

async fn process_item(
    repo: &dyn Repository,
    user_id: Uuid,
    item_id: Uuid,
    operation: PriceOperation,
) -> ItemOutcome {
    let item = match repo.item(user_id, item_id).await {
        Ok(Some(item)) => item,
        Ok(None) => return ItemOutcome::failed(item_id, "Item not found"),
        Err(e) => {
            tracing::error!(%item_id, "Failed to load item for {}: {}", operation.name(), e);
            return ItemOutcome::failed(item_id, "Failed to load item");
        }
    };

    let (changes, reported) = match operation.plan(&item) {
        Ok(planned) => planned,
        Err(reason) => {
            tracing::warn!(
                %item_id,
                price = item.price,
                ?reason,
                "Skipping item in {}",
                operation.name()
            );
            return ItemOutcome::skipped(item_id, item.price, reason);
        }
    };

    match repo.update_item(user_id, item_id, changes).await {
        Ok(_) => ItemOutcome::succeeded(item_id, item.price, reported),
        Err(e) => {
            tracing::error!(%item_id, "Failed to write item in {}: {}", operation.name(), e);
            ItemOutcome::failed(item_id, "Failed to save item")
        }
    }
}

/// Run `operation` over the selection, one item at a time
pub async fn run_operation(
    repo: &dyn Repository,
    user_id: Uuid,
    item_ids: &[Uuid],
    operation: PriceOperation,
) -> ReajusteReport {
    let mut report = ReajusteReport::default();
    for item_id in item_ids {
        report.push(process_item(repo, user_id, *item_id, operation).await);
    }
    tracing::info!(
        %user_id,
        operation = operation.name(),
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        "Reajuste finished"
    );
    report
}

async fn adjust(
    state: &AppState,
    user_id: Uuid,
    request: ReajusteRequest,
    wrap: fn(Adjustment) -> PriceOperation,
) -> ApiResult<ReajusteReport> {
    validate_selection(&request.item_ids)?;
    let adjustment = Adjustment::new(request.mode, request.magnitude)?;
    Ok(run_operation(state.repo.as_ref(), user_id, &request.item_ids, wrap(adjustment)).await)
}

async fn select(
    state: &AppState,
    user_id: Uuid,
    selection: ItemSelection,
    operation: PriceOperation,
) -> ApiResult<ReajusteReport> {
    validate_selection(&selection.item_ids)?;
    Ok(run_operation(state.repo.as_ref(), user_id, &selection.item_ids, operation).await)
}

pub async fn preview(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<ReajusteRequest>,
) -> ApiResult<Json<ReajusteReport>> {
    adjust(&state, auth.user_id, request, PriceOperation::Preview).await.map(Json)
}

pub async fn apply(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<ReajusteRequest>,
) -> ApiResult<Json<ReajusteReport>> {
    adjust(&state, auth.user_id, request, PriceOperation::Apply).await.map(Json)
}

pub async fn confirm(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(selection): Json<ItemSelection>,
) -> ApiResult<Json<ReajusteReport>> {
    select(&state, auth.user_id, selection, PriceOperation::Confirm).await.map(Json)
}

pub async fn discard(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(selection): Json<ItemSelection>,
) -> ApiResult<Json<ReajusteReport>> {
    select(&state, auth.user_id, selection, PriceOperation::Discard).await.map(Json)
}

pub async fn backup(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(selection): Json<ItemSelection>,
) -> ApiResult<Json<ReajusteReport>> {
    select(&state, auth.user_id, selection, PriceOperation::Backup).await.map(Json)
}

pub async fn restore(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(selection): Json<ItemSelection>,
) -> ApiResult<Json<ReajusteReport>> {
    select(&state, auth.user_id, selection, PriceOperation::Restore).await.map(Json)
}
