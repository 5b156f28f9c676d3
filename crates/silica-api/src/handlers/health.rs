//! Liveness check.

use axum::Json;
use serde_json::{json, Value};

/// Always `{"status": "OK"}` while the process is serving.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
