//! # silica-api
//!
//! HTTP boundary of the silica job service: submission, artifact
//! retrieval, the paginated result view, the genome index listing and a
//! health check.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use silica_core::SilicaConfig;
use silica_jobs::Pipeline;

pub use error::ApiError;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SilicaConfig>,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(config: SilicaConfig) -> Self {
        let pipeline = Pipeline::from_config(&config);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }
}

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// CORS origins from config; an empty list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/v1/health", get(handlers::health::health))
        .route(
            "/api/v1/upload",
            axum::routing::post(handlers::upload::upload),
        )
        .route("/api/v1/results/:id", get(handlers::results::get_result))
        .route(
            "/api/v1/results/:id/view",
            get(handlers::results::view_result),
        )
        .route(
            "/api/v1/genomeindex",
            get(handlers::genome_index::genome_index).post(handlers::genome_index::genome_index),
        )
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
