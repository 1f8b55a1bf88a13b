//! Agent card endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;

use crate::state::AppState;

async fn agent_card(State(state): State<AppState>) -> Json<Value> {
    Json(state.card().clone())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/.well-known/agent-card.json", get(agent_card))
}
