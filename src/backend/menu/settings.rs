//! Public menu presentation settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::SharedError;

pub const DEFAULT_ACCENT_COLOR: &str = "#b5462f";

/// How a user's public menu is presented
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct MenuSettings {
    pub user_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub footer_note: Option<String>,
    /// `#rrggbb`
    pub accent_color: String,
    pub show_descriptions: bool,
    /// Unpublished menus answer 404 on the public endpoint
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

impl MenuSettings {
    /// Settings used before the owner saves anything
    pub fn defaults_for(user_id: Uuid, username: &str) -> Self {
        Self {
            user_id,
            title: username.to_string(),
            subtitle: None,
            footer_note: None,
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            show_descriptions: true,
            published: true,
            updated_at: Utc::now(),
        }
    }
}

/// Body of `PUT /api/menu/settings`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSettingsInput {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub footer_note: Option<String>,
    #[serde(default = "default_accent")]
    pub accent_color: String,
    #[serde(default = "default_true")]
    pub show_descriptions: bool,
    #[serde(default = "default_true")]
    pub published: bool,
}

fn default_accent() -> String {
    DEFAULT_ACCENT_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

impl MenuSettingsInput {
    /// Trim text fields and check the color format
    pub fn normalized(mut self) -> Result<Self, SharedError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() || self.title.chars().count() > 80 {
            return Err(SharedError::validation("title", "Title must have 1 to 80 characters"));
        }
        self.subtitle = trim_optional(self.subtitle);
        self.footer_note = trim_optional(self.footer_note);
        if !is_hex_color(&self.accent_color) {
            return Err(SharedError::validation("accent_color", "Color must look like #a1b2c3"));
        }
        self.accent_color = self.accent_color.to_lowercase();
        Ok(self)
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
