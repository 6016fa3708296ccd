use std::sync::Arc;

use stocksync_app::{app::AppBus, config::Config, sweeper::ExpiredJobSweeper};
use stocksync_db::{
    establish_catalog_pool, establish_connection_pool, uow::PostgresUnitOfWorkProvider,
};
use stocksync_types::{Result, errors::ApplicationError};
use stocksync_web::{AppState, WebRouter};

mod logs;
use logs::setup_logging;

#[tokio::main]
#[cfg(not(tarpaulin_include))]
async fn main() -> Result<(), ApplicationError> {
    setup_logging();
    let (config, app_bus, sweeper) = setup_app().await?;
    let state = AppState::new(app_bus, &config);

    sweeper.run();
    WebRouter::serve(state, config.port).await
}

async fn setup_app() -> Result<(Arc<Config>, Arc<AppBus>, Arc<ExpiredJobSweeper>), ApplicationError>
{
    let config = Arc::new(Config::from_env());
    let db_pool = establish_connection_pool().await?;
    let catalog_pool = establish_catalog_pool().await?;

    sqlx::migrate!("../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| ApplicationError::Unknown(e.to_string()))?;

    let uow_provider = Arc::new(PostgresUnitOfWorkProvider::new(db_pool, catalog_pool));
    let app_bus = Arc::new(AppBus::new(config.clone(), uow_provider.clone()));
    let sweeper = Arc::new(ExpiredJobSweeper::new(uow_provider, config.clone()));

    tracing::info!(
        chunk_size = config.default_chunk_size,
        job_ttl_secs = config.job_ttl_secs,
        "Stock sync service configured"
    );

    Ok((config, app_bus, sweeper))
}
