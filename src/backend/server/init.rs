/**
 * Server Initialization
 *
 * Builds the application from a `ServerConfig`.
 *
 * # Initialization Process
 *
 * 1. Open the store (PostgreSQL with migrations, or in-memory)
 * 2. Seed the default plans (`anual`, `unico`)
 * 3. Build providers (Stripe or disabled billing, SMTP or log mailer)
 * 4. Create the router
 *
 * A configured database that cannot be reached stops startup. A failure to
 * seed plans is logged and startup continues; admins can create plans by
 * hand.
 */

use axum::Router;

use crate::backend::billing::plans::seed_default_plans;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;

/// Create and configure the Axum application
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, StoreError> {
    tracing::info!("Initializing cardapio backend server");

    let repo = config.load_repository().await?;

    match seed_default_plans(repo.as_ref(), &config.stripe).await {
        Ok(seeded) if !seeded.is_empty() => {
            tracing::info!("Seeded or linked {} default plan(s)", seeded.len())
        }
        Ok(_) => tracing::debug!("Default plans already present"),
        Err(e) => tracing::error!("Failed to seed default plans: {}", e),
    }

    let state = AppState::from_config(config, repo);
    Ok(create_app_with_state(state))
}

/// Router over an existing state; tests use this with fakes
pub fn create_app_with_state(state: AppState) -> Router<()> {
    let app = create_router(state);
    tracing::info!("Router configured");
    app
}
