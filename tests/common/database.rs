//! Database test fixtures and utilities
//!
//! The PostgreSQL tests run only when `DATABASE_URL` points at a disposable
//! database; otherwise they return early.

use cardapio::backend::store::PgRepository;

/// `DATABASE_URL`, if the environment provides one
pub fn test_database_url() -> Option<String> {
    dotenv::dotenv().ok();
    std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

/// Connected and migrated repository, or `None` to skip
pub async fn pg_repository() -> Option<PgRepository> {
    let Some(url) = test_database_url() else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };
    let repo = PgRepository::connect(&url)
        .await
        .expect("Failed to connect to the test database");
    Some(repo)
}

/// Unique suffix so concurrent test runs do not collide on unique columns
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..10].to_string()
}
