use sqlx::postgres::{PgPool, PgPoolOptions};
use std::{env, time::Duration};

use stocksync_types::errors::DbError;

pub type DbPool = PgPool;

/// Connections for unit of work transactions, one held per running command.
const TRANSACTION_POOL_SIZE: u32 = 5;
/// Connections for catalog reads and writes, each borrowed for one statement.
const CATALOG_POOL_SIZE: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn establish_connection_pool() -> Result<DbPool, DbError> {
    init_connection_pool("DATABASE_URL", TRANSACTION_POOL_SIZE).await
}

/// Catalog I/O must never wait on the transaction pool: every command already
/// holds one of its connections.
pub async fn establish_catalog_pool() -> Result<DbPool, DbError> {
    init_connection_pool("DATABASE_URL", CATALOG_POOL_SIZE).await
}

pub async fn establish_test_connection_pool() -> Result<DbPool, DbError> {
    init_connection_pool("TEST_DATABASE_URL", TRANSACTION_POOL_SIZE).await
}

pub async fn establish_test_catalog_pool() -> Result<DbPool, DbError> {
    init_connection_pool("TEST_DATABASE_URL", CATALOG_POOL_SIZE).await
}

async fn init_connection_pool(
    database_env: &'static str,
    max_connections: u32,
) -> Result<DbPool, DbError> {
    dotenvy::dotenv().ok();

    let database_url =
        env::var(database_env).unwrap_or_else(|_| panic!("{} must be set", database_env));

    Ok(PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&database_url)
        .await?)
}
