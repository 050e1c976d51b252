//! Shared Module
//!
//! Types and pure logic that do not depend on the HTTP layer or the store:
//! catalog data structures, reajuste arithmetic, display-order planning and
//! price formatting. Everything here is synchronous and side-effect free,
//! which keeps the core rules testable without a server.

/// Catalog data structures and request bodies
pub mod catalog;

/// Reajuste arithmetic
pub mod pricing;

/// Bulk price operation requests and reports
pub mod reajuste;

/// Drag-and-drop rank planning
pub mod ordering;

/// Price formatting
pub mod money;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use catalog::{CatalogSnapshot, Category, CategoryWithItems, Item};
pub use error::SharedError;
pub use pricing::{Adjustment, AdjustmentMode, SkipReason};
pub use reajuste::{ItemOutcome, ItemSelection, ItemStatus, ReajusteReport, ReajusteRequest};
