//! Health check endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;
use crate::tools::ToolName;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    tools_loaded: Vec<&'static str>,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tools_loaded: ToolName::ALL.iter().map(ToolName::as_str).collect(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
