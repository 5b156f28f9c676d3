//! Job submission.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use tracing::debug;

use crate::{ApiError, AppState};

/// Submit primers and run parameters.
///
/// Accepts `multipart/form-data` or `application/x-www-form-urlencoded`
/// with `fastaText`, `genome` and the twelve `set*` option keys.
///
/// # Returns
/// - 200 OK with `{"uuid", "data": {"primer", "amplicon"}, "errors": []}`
/// - 400 Bad Request for input and parameter errors (`{"errors": [...]}`)
/// - 400 Bad Request with the full payload when the tool run failed
/// - 500 Internal Server Error when the tool could not be launched
pub async fn upload(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let fields = read_fields(request, &state).await?;
    debug!(field_count = fields.len(), "upload: form received");

    let submission = state.pipeline.submit(fields).await?;
    let status = if submission.failure.is_some() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    Ok((status, Json(submission.result)).into_response())
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// Collect every named form field as text. Later duplicates win.
async fn read_fields(request: Request, state: &AppState) -> Result<HashMap<String, String>, ApiError> {
    if !is_multipart(&request) {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(request, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid form: {}", e)))?;
        return Ok(fields);
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?;

    let mut fields = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?;
        fields.insert(name, value);
    }
    Ok(fields)
}
