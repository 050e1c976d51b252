/**
 * Reajuste Requests and Reports
 *
 * Bulk price operations run item by item and report what happened to each
 * one. A failure on one item does not undo the items already written.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::pricing::{AdjustmentMode, SkipReason};

/// Body of `/api/reajuste/preview` and `/api/reajuste/apply`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReajusteRequest {
    pub item_ids: Vec<Uuid>,
    pub mode: AdjustmentMode,
    pub magnitude: f64,
}

/// Body of confirm, discard, backup and restore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSelection {
    pub item_ids: Vec<Uuid>,
}

/// Reject empty selections and repeated ids
pub fn validate_selection(item_ids: &[Uuid]) -> Result<(), SharedError> {
    if item_ids.is_empty() {
        return Err(SharedError::validation("item_ids", "Select at least one item"));
    }
    let mut seen = std::collections::HashSet::with_capacity(item_ids.len());
    for id in item_ids {
        if !seen.insert(id) {
            return Err(SharedError::duplicate_identifier(id));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Succeeded,
    Failed,
    Skipped,
}

/// What happened to one selected item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub item_id: Uuid,
    pub status: ItemStatus,
    /// Price before the operation, when the item was found
    #[serde(default)]
    pub old_price: Option<f64>,
    /// Price written (or staged, for preview)
    #[serde(default)]
    pub new_price: Option<f64>,
    #[serde(default)]
    pub skip_reason: Option<SkipReason>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ItemOutcome {
    pub fn succeeded(item_id: Uuid, old_price: f64, new_price: Option<f64>) -> Self {
        Self {
            item_id,
            status: ItemStatus::Succeeded,
            old_price: Some(old_price),
            new_price,
            skip_reason: None,
            error: None,
        }
    }

    pub fn skipped(item_id: Uuid, old_price: f64, reason: SkipReason) -> Self {
        Self {
            item_id,
            status: ItemStatus::Skipped,
            old_price: Some(old_price),
            new_price: None,
            skip_reason: Some(reason),
            error: None,
        }
    }

    pub fn failed(item_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            item_id,
            status: ItemStatus::Failed,
            old_price: None,
            new_price: None,
            skip_reason: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate result of a bulk operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReajusteReport {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<ItemOutcome>,
}

impl ReajusteReport {
    pub fn push(&mut self, outcome: ItemOutcome) {
        match outcome.status {
            ItemStatus::Succeeded => self.succeeded += 1,
            ItemStatus::Failed => self.failed += 1,
            ItemStatus::Skipped => self.skipped += 1,
        }
        self.results.push(outcome);
    }
}
