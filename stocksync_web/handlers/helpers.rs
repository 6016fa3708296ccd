use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

use stocksync_app::auth::{Caller, authorize};
use stocksync_types::errors::{AppError, ApplicationError};

use crate::http::AppState;

pub const OWNER_ID_HEADER: &str = "X-Owner-Id";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

pub fn map_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
        .into_response()
}

/// Turns a failed command or query into the matching HTTP answer.
pub fn app_error_response(e: ApplicationError) -> Response {
    let status = match &e {
        ApplicationError::App(AppError::Forbidden) => StatusCode::FORBIDDEN,
        ApplicationError::App(AppError::SyncJobNotFound(_)) => StatusCode::NOT_FOUND,
        ApplicationError::App(
            AppError::InvalidCategoryId(_) | AppError::InvalidPriceAdjust(_),
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationError::Ingest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        e if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {e}");
    }
    let message = match status {
        StatusCode::SERVICE_UNAVAILABLE => "Storage temporarily unavailable, retry".to_string(),
        StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
        _ => e.to_string(),
    };
    map_error(status, message)
}

/// A caller allowed to administer the catalog. Extraction fails with `403`
/// before any handler code runs.
#[derive(Debug, Clone)]
pub struct AuthorizedCaller(pub Caller);

impl FromRequestParts<AppState> for AuthorizedCaller {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).unwrap_or_default();
        let owner_id = owner_id(&parts.headers).ok_or_else(|| {
            map_error(
                StatusCode::BAD_REQUEST,
                format!("Missing or invalid {OWNER_ID_HEADER} header"),
            )
        })?;

        let caller = Caller::new(owner_id, token);
        authorize(state.access_policy.as_ref(), &caller)
            .map_err(|e| app_error_response(e.into()))?;

        Ok(AuthorizedCaller(caller))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned())
}

fn owner_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(OWNER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(owner_id(&headers), None);

        let id = Uuid::new_v4();
        headers.insert("Authorization", HeaderValue::from_static("Bearer s3cret"));
        headers.insert(OWNER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("s3cret"));
        assert_eq!(owner_id(&headers), Some(id));

        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        headers.insert(OWNER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(owner_id(&headers), None);
    }

    #[test]
    fn test_error_statuses() {
        let status = |e: ApplicationError| app_error_response(e).status();

        assert_eq!(status(AppError::Forbidden.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            status(AppError::SyncJobNotFound(Uuid::new_v4()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(stocksync_types::errors::IngestError::EmptyInput.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(ApplicationError::Infrastructure("down".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(ApplicationError::Unknown("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
