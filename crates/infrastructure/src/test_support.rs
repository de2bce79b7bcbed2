//! PostgreSQL test fixtures; tests return early when `DATABASE_URL` is unset.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

static SCRATCH_COUNTER: AtomicU32 = AtomicU32::new(0);

pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = crate::MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tests: {error}");
    }

    Some(pool)
}

/// Returns a table name no other test run uses.
pub(crate) fn scratch_table_name(prefix: &str) -> String {
    format!(
        "{prefix}_{}_{}_{}",
        std::process::id(),
        Utc::now().timestamp_subsec_micros(),
        SCRATCH_COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}
