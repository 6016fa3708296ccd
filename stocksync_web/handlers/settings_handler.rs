use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};

use stocksync_app::{
    cqrs::queries::GetPriceAdjustDefaults, queries_handlers::GetPriceAdjustDefaultsHandler,
};

use crate::{
    handlers::{AuthorizedCaller, app_error_response},
    http::AppState,
};

/// GET /settings/price-adjust
pub async fn price_adjust_defaults(
    State(state): State<AppState>,
    _caller: AuthorizedCaller,
) -> Response {
    match state
        .app_bus
        .query(GetPriceAdjustDefaults, GetPriceAdjustDefaultsHandler::new())
        .await
    {
        Ok(adjust) => Json(adjust).into_response(),
        Err(e) => app_error_response(e),
    }
}
