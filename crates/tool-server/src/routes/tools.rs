//! Tool invocation and discovery endpoints
//!
//! `POST /tools/{tool_name}` runs one tool with a flat JSON argument object
//! and returns the envelope as a string under `result`. Only an unknown tool
//! name is an HTTP error; handler failures are data inside the envelope.

use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::invocations::InvocationRecord;
use crate::state::AppState;
use crate::tools::{self, ToolName};

#[derive(Serialize)]
struct ListToolsResponse {
    tools: Vec<&'static str>,
}

#[derive(Serialize)]
struct InvokeResponse {
    result: String,
}

async fn list_tools() -> Json<ListToolsResponse> {
    Json(ListToolsResponse {
        tools: ToolName::ALL.iter().map(ToolName::as_str).collect(),
    })
}

async fn invoke_tool(
    State(state): State<AppState>,
    Path(tool_name): Path<String>,
    body: Option<Json<Value>>,
) -> Response {
    let Some(tool) = ToolName::parse(&tool_name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("tool '{}' not found", tool_name) })),
        )
            .into_response();
    };

    let arguments = body.map(|Json(value)| value).unwrap_or_else(|| json!({}));
    let started = Instant::now();
    let envelope = tools::dispatch(&state, tool, arguments.clone()).await;

    state.invocations().record(&InvocationRecord::from_envelope(
        tool.as_str(),
        arguments,
        &envelope,
        started.elapsed(),
    ));

    Json(InvokeResponse { result: envelope }).into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/{tool_name}", post(invoke_tool))
}
