/**
 * Reajuste Price Arithmetic
 *
 * Pure functions for bulk price adjustments. A reajuste is described by a
 * mode and a magnitude:
 *
 * - `fixed`: new = current + magnitude
 * - `percentage`: new = current * (1 + magnitude / 100)
 *
 * Results are not clamped or rounded. A fixed adjustment larger than the
 * current price produces a negative price and that value is stored as-is.
 * Display code rounds to cents (see `shared::money`).
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// How the magnitude of an adjustment is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentMode {
    /// Add the magnitude to the current price
    Fixed,
    /// Scale the current price by `magnitude` percent
    Percentage,
}

/// A validated bulk adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub mode: AdjustmentMode,
    pub magnitude: f64,
}

/// Why an item was left out of a reajuste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The stored price is below zero
    NegativePrice,
    /// The stored price is NaN or infinite
    NonFinitePrice,
    /// Confirm was requested but no staged price exists
    NothingStaged,
    /// Restore was requested but no backup exists
    NoBackup,
}

impl Adjustment {
    /// Build an adjustment, rejecting magnitudes that are zero or not finite
    pub fn new(mode: AdjustmentMode, magnitude: f64) -> Result<Self, SharedError> {
        if !magnitude.is_finite() {
            return Err(SharedError::validation(
                "magnitude",
                "Magnitude must be a finite number",
            ));
        }
        if magnitude == 0.0 {
            return Err(SharedError::validation(
                "magnitude",
                "Magnitude must be different from zero",
            ));
        }
        Ok(Self { mode, magnitude })
    }

    /// Compute the adjusted price for one item.
    ///
    /// Items whose current price is negative or not finite are skipped.
    pub fn apply(&self, current: f64) -> Result<f64, SkipReason> {
        check_adjustable(current)?;
        Ok(adjusted_price(self.mode, current, self.magnitude))
    }
}

/// Raw reajuste formula with no validation
pub fn adjusted_price(mode: AdjustmentMode, current: f64, magnitude: f64) -> f64 {
    match mode {
        AdjustmentMode::Fixed => current + magnitude,
        AdjustmentMode::Percentage => current * (1.0 + magnitude / 100.0),
    }
}

/// A price is adjustable when it is a finite, non-negative number
pub fn check_adjustable(current: f64) -> Result<(), SkipReason> {
    if !current.is_finite() {
        return Err(SkipReason::NonFinitePrice);
    }
    if current < 0.0 {
        return Err(SkipReason::NegativePrice);
    }
    Ok(())
}

/// Validate a price entered by a user on item create/update
pub fn validate_price(field: &str, price: f64) -> Result<(), SharedError> {
    if !price.is_finite() {
        return Err(SharedError::validation(field, "Price must be a finite number"));
    }
    if price < 0.0 {
        return Err(SharedError::validation(field, "Price cannot be negative"));
    }
    Ok(())
}
