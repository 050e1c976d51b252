//! Maintenance Module
//!
//! One-off data repair jobs, run from their own binaries rather than the
//! server.
//!
//! ```text
//! maintenance/
//! ├── mod.rs          - Module exports
//! └── backfill.rs     - Plan backfill for legacy billing rows
//! ```

pub mod backfill;

pub use backfill::{backfill_plans, BackfillReport};
