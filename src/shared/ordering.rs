//! Display Order Planning
//!
//! Drag-and-drop reordering sends the final visual order of a sibling list
//! (items within one category, or a user's categories). This module turns
//! that list into the ranks that must be written.
//!
//! Rules:
//! - rank = 0-based position in the submitted list
//! - an empty submission plans nothing
//! - every submitted id must be a current sibling, and appear once
//! - siblings missing from the submission keep their relative order and are
//!   ranked after the submitted ones, so ranks stay unique

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use crate::shared::error::SharedError;

/// Compute `(id, rank)` pairs for a reorder request.
///
/// `current` is the sibling list in its present display order.
pub fn plan_ranks<Id>(current: &[Id], submitted: &[Id]) -> Result<Vec<(Id, i32)>, SharedError>
where
    Id: Copy + Eq + Hash + Display,
{
    if submitted.is_empty() {
        return Ok(Vec::new());
    }

    let siblings: HashSet<Id> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(submitted.len());
    for id in submitted {
        if !siblings.contains(id) {
            return Err(SharedError::unknown_identifier(id));
        }
        if !seen.insert(*id) {
            return Err(SharedError::duplicate_identifier(id));
        }
    }

    let remaining = current.iter().filter(|id| !seen.contains(*id));
    Ok(submitted
        .iter()
        .chain(remaining)
        .enumerate()
        .map(|(rank, id)| (*id, rank as i32))
        .collect())
}

/// Rank for an entity appended at the end of a sibling list
pub fn next_rank(existing: impl IntoIterator<Item = i32>) -> i32 {
    existing.into_iter().max().map_or(0, |max| max + 1)
}
