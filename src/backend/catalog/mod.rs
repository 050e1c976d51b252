//! Catalog Module
//!
//! HTTP handlers for a user's categories and items, drag-and-drop ordering
//! and bulk price operations ("reajuste"). The rules themselves live in
//! `shared`; these handlers load, validate, persist and log.
//!
//! # Module Structure
//!
//! ```text
//! catalog/
//! ├── mod.rs         - Module exports
//! ├── categories.rs  - Category CRUD and catalog snapshot
//! ├── items.rs       - Item CRUD
//! ├── ordering.rs    - Reorder endpoints
//! └── reajuste.rs    - Preview/confirm/apply, backup/restore
//! ```

pub mod categories;
pub mod items;
pub mod ordering;
pub mod reajuste;
