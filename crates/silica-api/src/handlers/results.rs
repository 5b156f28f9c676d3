//! Artifact retrieval and the paginated result view.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use silica_core::{CompoundId, ViewRequest};
use silica_jobs::{codec, JobView};

use crate::{ApiError, AppState};

/// Serve one stored artifact addressed by a compound identifier.
///
/// # Returns
/// - 200 OK with the raw artifact bytes
/// - 404 Not Found for malformed identifiers and absent artifacts alike
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = CompoundId::parse(&id)?;
    let artifact = codec::load(state.pipeline.store(), &id).await?;

    let headers = [
        (header::CONTENT_TYPE, artifact.content_type.to_string()),
        (header::CONTENT_DISPOSITION, artifact.content_disposition()),
    ];
    Ok((headers, artifact.bytes).into_response())
}

/// Windowed view over both result lists of a job.
///
/// Window positions travel with each request; the server keeps no session.
///
/// # Returns
/// - 200 OK for any job the tool was run for, including one whose error log
///   is non-empty. Those diagnostics are listed in `errors`; the view does
///   not turn them into a 400 the way the upload response does.
/// - 404 Not Found for malformed ids, unknown jobs and jobs rejected before
///   the tool ran
pub async fn view_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(request): Query<ViewRequest>,
) -> Result<Json<JobView>, ApiError> {
    let job_id = CompoundId::parse_job_id(&id)?;
    let view = state
        .pipeline
        .view(&job_id, &request, state.config.page_step)
        .await?;
    Ok(Json(view))
}
