//! Menu Module
//!
//! The public, read-only menu page served at `/api/menu/{username}` and the
//! owner's settings for it (title, colors, published flag).

pub mod handlers;
pub mod settings;

pub use settings::{MenuSettings, MenuSettingsInput};
