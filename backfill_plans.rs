//! Backfill plans on legacy subscriptions and one-time payments.
//!
//! ```text
//! cargo run --bin backfill_plans -- [--dry-run]
//! ```
//!
//! Needs `DATABASE_URL` and `STRIPE_SECRET_KEY` (a `.env` file is honoured).

use cardapio::backend::billing::StripeClient;
use cardapio::backend::maintenance::backfill_plans;
use cardapio::backend::server::config::ServerConfig;
use cardapio::backend::store::PgRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let dry_run = std::env::args().skip(1).any(|arg| arg == "--dry-run");
    let config = ServerConfig::from_env()?;

    let database_url = config
        .database_url
        .as_deref()
        .ok_or("DATABASE_URL must be set")?;
    let stripe = StripeClient::from_config(&config.stripe).ok_or("STRIPE_SECRET_KEY must be set")?;

    println!("Connecting to database...");
    let repo = PgRepository::connect(database_url).await?;

    if dry_run {
        println!("Dry run: no rows will be written");
    }
    let report = backfill_plans(&repo, &stripe, dry_run).await?;

    println!("Backfill finished");
    println!("  updated:    {}", report.updated);
    println!("  unresolved: {}", report.unresolved);
    println!("  failed:     {}", report.failed);

    if report.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
