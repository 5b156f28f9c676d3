//! Static genome index listing.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::{ApiError, AppState};

/// Serve `genomeindexindex.json` from the genome root verbatim.
///
/// Answers both GET and POST.
pub async fn genome_index(State(state): State<AppState>) -> Result<Response, ApiError> {
    let path = state.config.genome_listing_path();
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "genome index listing absent");
            return Err(ApiError::NotFound(
                "Genome index listing not available".to_string(),
            ));
        }
        Err(e) => return Err(silica_core::Error::from(e).into()),
    };

    Ok(([(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}
