use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use std::{io::Error, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use stocksync_app::{
    app::AppBus,
    auth::{AccessPolicy, TokenAccessPolicy},
    config::Config,
};
use stocksync_types::{Result, errors::ApplicationError};

use crate::handlers::{
    cancel_sync_job, create_sync_job, price_adjust_defaults, resume_sync_job, run_sync_chunk,
};

/// Upper bound for uploaded stock files.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub app_bus: Arc<AppBus>,
    pub access_policy: Arc<dyn AccessPolicy>,
}

impl AppState {
    pub fn new(app_bus: Arc<AppBus>, config: &Config) -> AppState {
        let access_policy = Arc::new(TokenAccessPolicy::new(config.admin_token_hash.clone()));
        AppState::with_policy(app_bus, access_policy)
    }

    pub fn with_policy(app_bus: Arc<AppBus>, access_policy: Arc<dyn AccessPolicy>) -> AppState {
        AppState {
            app_bus,
            access_policy,
        }
    }
}

pub struct WebRouter {}

impl WebRouter {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/sync-jobs", post(create_sync_job))
            .route("/sync-jobs/resume", get(resume_sync_job))
            .route("/sync-jobs/{id}", delete(cancel_sync_job))
            .route("/sync-jobs/{id}/chunk", post(run_sync_chunk))
            .route("/settings/price-adjust", get(price_adjust_defaults))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve(state: AppState, port: u16) -> Result<(), ApplicationError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(infra_error)?;
        Self::serve_on(state, listener).await
    }

    /// Serves on an already bound listener, e.g. one bound to port 0.
    pub async fn serve_on(state: AppState, listener: TcpListener) -> Result<(), ApplicationError> {
        let addr = listener.local_addr().map_err(infra_error)?;
        tracing::info!("HTTP Server started, listening on http://{}", addr);

        axum::serve(listener, Self::router(state))
            .await
            .map_err(infra_error)?;

        Ok(())
    }
}

fn infra_error(e: Error) -> ApplicationError {
    let err = format!("{:#?}", e);
    ApplicationError::Infrastructure(err)
}
