use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stocksync_app::{
    command_handlers::{
        CancelSyncJobCommandHandler, CreateSyncJobCommandHandler, RunSyncChunkCommandHandler,
    },
    cqrs::{
        commands::{CancelSyncJob, RunSyncChunk},
        queries::GetResumableSyncJob,
    },
    queries_handlers::GetResumableSyncJobHandler,
};

use crate::{
    handlers::{
        AuthorizedCaller, app_error_response, map_error,
        upload_form::{FormError, UploadForm},
    },
    http::AppState,
};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChunkRequest {
    #[serde(default)]
    pub peek: bool,
}

#[derive(Debug, Serialize)]
struct CancelResponse {
    ok: bool,
}

/// POST /sync-jobs
pub async fn create_sync_job(
    State(state): State<AppState>,
    AuthorizedCaller(caller): AuthorizedCaller,
    multipart: Multipart,
) -> Response {
    let command = match UploadForm::read(multipart)
        .await
        .and_then(|form| form.into_command(caller.owner_id))
    {
        Ok(command) => command,
        Err(FormError::Malformed(message)) => return map_error(StatusCode::BAD_REQUEST, message),
        Err(FormError::MissingFile) => {
            return map_error(StatusCode::BAD_REQUEST, "Missing CSV file");
        }
        Err(FormError::Invalid(e)) => return app_error_response(e.into()),
    };

    match state
        .app_bus
        .execute(command, CreateSyncJobCommandHandler::new())
        .await
    {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => app_error_response(e),
    }
}

/// POST /sync-jobs/{id}/chunk
pub async fn run_sync_chunk(
    State(state): State<AppState>,
    AuthorizedCaller(_caller): AuthorizedCaller,
    Path(job_id): Path<Uuid>,
    Json(request): Json<ChunkRequest>,
) -> Response {
    let command = RunSyncChunk {
        job_id,
        peek: request.peek,
    };

    match state
        .app_bus
        .execute(command, RunSyncChunkCommandHandler::new())
        .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => app_error_response(e),
    }
}

/// DELETE /sync-jobs/{id}
pub async fn cancel_sync_job(
    State(state): State<AppState>,
    AuthorizedCaller(caller): AuthorizedCaller,
    Path(job_id): Path<Uuid>,
) -> Response {
    let command = CancelSyncJob {
        owner_id: caller.owner_id,
        job_id,
    };

    match state
        .app_bus
        .execute(command, CancelSyncJobCommandHandler::new())
        .await
    {
        Ok(()) => Json(CancelResponse { ok: true }).into_response(),
        Err(e) => app_error_response(e),
    }
}

/// GET /sync-jobs/resume
pub async fn resume_sync_job(
    State(state): State<AppState>,
    AuthorizedCaller(caller): AuthorizedCaller,
) -> Response {
    let query = GetResumableSyncJob {
        owner_id: caller.owner_id,
    };

    match state
        .app_bus
        .query(query, GetResumableSyncJobHandler::new())
        .await
    {
        Ok(Some(resumable)) => Json(resumable).into_response(),
        Ok(None) => map_error(StatusCode::NOT_FOUND, "No sync job to resume"),
        Err(e) => app_error_response(e),
    }
}
