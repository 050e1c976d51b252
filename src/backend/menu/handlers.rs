/**
 * Menu Handlers
 *
 * - GET /api/menu/{username} - public, read-only menu page data
 * - GET /api/menu/settings   - owner's settings (defaults until first save)
 * - PUT /api/menu/settings   - save settings
 *
 * The public menu shows current prices only. Staged and backup prices never
 * leave the owner's routes.
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::settings::{MenuSettings, MenuSettingsInput};
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::money::format_brl;
use crate::shared::CatalogSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicItem {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    pub price: f64,
    /// `R$ 1.234,56`
    pub price_formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicCategory {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<PublicItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicMenu {
    pub username: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub footer_note: Option<String>,
    pub accent_color: String,
    pub categories: Vec<PublicCategory>,
}

/// Shape a catalog for public display; empty categories are left out
pub fn build_public_menu(
    username: &str,
    settings: &MenuSettings,
    snapshot: CatalogSnapshot,
) -> PublicMenu {
    let categories = snapshot
        .categories
        .into_iter()
        .filter(|c| !c.items.is_empty())
        .map(|c| PublicCategory {
            id: c.category.id,
            name: c.category.name,
            items: c
                .items
                .into_iter()
                .map(|item| PublicItem {
                    id: item.id,
                    name: item.name,
                    description: item.description.filter(|_| settings.show_descriptions),
                    price_formatted: format_brl(item.price),
                    price: item.price,
                })
                .collect(),
        })
        .collect();

    PublicMenu {
        username: username.to_string(),
        title: settings.title.clone(),
        subtitle: settings.subtitle.clone(),
        footer_note: settings.footer_note.clone(),
        accent_color: settings.accent_color.clone(),
        categories,
    }
}

/// Public menu for `username`; 404 if unknown or unpublished
pub async fn public_menu(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<PublicMenu>> {
    let username = username.trim().to_lowercase();
    let user = state
        .repo
        .user_by_username(&username)
        .await?
        .ok_or_else(|| BackendError::not_found("Menu"))?;

    let settings = state
        .repo
        .menu_settings(user.id)
        .await?
        .unwrap_or_else(|| MenuSettings::defaults_for(user.id, &user.username));
    if !settings.published {
        tracing::debug!("Menu for {} is not published", user.username);
        return Err(BackendError::not_found("Menu"));
    }

    let categories = state.repo.list_categories(user.id).await?;
    let items = state.repo.list_items(user.id, None).await?;
    let snapshot = CatalogSnapshot::assemble(categories, items);

    Ok(Json(build_public_menu(&user.username, &settings, snapshot)))
}

pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<MenuSettings>> {
    let settings = state
        .repo
        .menu_settings(auth.user_id)
        .await?
        .unwrap_or_else(|| MenuSettings::defaults_for(auth.user_id, &auth.username));
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(input): Json<MenuSettingsInput>,
) -> ApiResult<Json<MenuSettings>> {
    let input = input.normalized()?;
    let settings = state.repo.save_menu_settings(auth.user_id, input).await?;
    tracing::info!(
        user = %auth.username,
        published = settings.published,
        "Menu settings saved"
    );
    Ok(Json(settings))
}
