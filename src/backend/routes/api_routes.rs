/**
 * API Routes
 *
 * Every `/api/...` endpoint, grouped by the middleware in front of it.
 *
 * # Layers
 *
 * - public: no authentication
 * - account: `auth_middleware` only (auth, billing; an unpaid user must be
 *   able to pay)
 * - gated: `auth_middleware` then the capability gate (402 when denied)
 * - admin: `auth_middleware` then `require_admin` (403)
 *
 * `route_layer` is applied per group before the groups are merged, so each
 * gate only wraps its own routes. The auth layer is added last and therefore
 * runs first.
 */

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};

use crate::backend::admin;
use crate::backend::auth::handlers::{
    change_email, change_password, forgot_password, get_me, login, register, reset_password,
};
use crate::backend::billing::handlers as billing;
use crate::backend::catalog::{categories, items, ordering, reajuste};
use crate::backend::menu::handlers as menu;
use crate::backend::middleware::{
    auth_middleware, gate_catalog_read, gate_catalog_write, gate_menu, gate_reajuste,
    require_admin,
};
use crate::backend::server::state::AppState;

/// Routes reachable without a token
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/billing/plans", get(billing::list_plans))
        .route("/api/billing/webhook", post(billing::stripe_webhook))
        .route("/api/menu/{username}", get(menu::public_menu))
}

/// Signed-in routes that are never gated by payment
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/auth/email", put(change_email))
        .route("/api/auth/password", put(change_password))
        .route("/api/billing/checkout", post(billing::create_checkout))
        .route("/api/billing/portal", post(billing::create_portal))
        .route("/api/billing/status", get(billing::billing_status))
}

fn catalog_read_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(categories::list_catalog))
        .route("/api/items", get(items::list_items))
        .route_layer(from_fn_with_state(state.clone(), gate_catalog_read))
}

fn catalog_write_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/categories", post(categories::create_category))
        .route("/api/categories/order", put(ordering::reorder_categories))
        .route(
            "/api/categories/{id}",
            put(categories::rename_category).delete(categories::delete_category),
        )
        .route("/api/categories/{id}/items/order", put(ordering::reorder_items))
        .route("/api/items", post(items::create_item))
        .route(
            "/api/items/{id}",
            put(items::update_item).delete(items::delete_item),
        )
        .route_layer(from_fn_with_state(state.clone(), gate_catalog_write))
}

fn reajuste_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/reajuste/preview", post(reajuste::preview))
        .route("/api/reajuste/confirm", post(reajuste::confirm))
        .route("/api/reajuste/discard", post(reajuste::discard))
        .route("/api/reajuste/apply", post(reajuste::apply))
        .route("/api/items/backup", post(reajuste::backup))
        .route("/api/items/restore", post(reajuste::restore))
        .route_layer(from_fn_with_state(state.clone(), gate_reajuste))
}

fn menu_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/menu/settings",
            get(menu::get_settings).put(menu::update_settings),
        )
        .route_layer(from_fn_with_state(state.clone(), gate_menu))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}", patch(admin::update_user_flags))
        .route("/api/admin/plans", get(admin::list_plans))
        .route("/api/admin/plans/{code}", put(admin::upsert_plan))
        .route_layer(from_fn(require_admin))
}

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
/// * `state` - Needed by the middleware layers, which read the store
pub fn configure_api_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(account_routes())
        .merge(catalog_read_routes(state))
        .merge(catalog_write_routes(state))
        .merge(reajuste_routes(state))
        .merge(menu_routes(state))
        .merge(admin_routes())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    router.merge(public_routes()).merge(protected)
}
