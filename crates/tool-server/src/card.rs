//! Agent card served at `/.well-known/agent-card.json`
//!
//! The card is static metadata describing this bridge to other agents. An
//! operator can supply their own as a TOML file via `ARENA_CARD_PATH`;
//! otherwise a built-in card listing the tool registry as skills is used.

use std::path::Path;

use serde_json::{json, Value};
use tracing::warn;

use crate::tools::ToolName;

/// Load the agent card, falling back to the built-in one
pub fn load(path: Option<&Path>) -> Value {
    if let Some(path) = path {
        match std::fs::read_to_string(path) {
            Ok(text) => match toml::from_str::<Value>(&text) {
                Ok(card) => return card,
                Err(err) => warn!(
                    "Ignoring malformed agent card {}: {}",
                    path.display(),
                    err
                ),
            },
            Err(err) => warn!("Failed to read agent card {}: {}", path.display(), err),
        }
    }
    default_card()
}

/// Built-in card derived from the tool registry
pub fn default_card() -> Value {
    let skills: Vec<Value> = ToolName::ALL
        .iter()
        .map(|tool| {
            json!({
                "name": tool.as_str(),
                "description": tool.description(),
            })
        })
        .collect();

    json!({
        "name": "arena-bridge",
        "description": "Bridge between the task agents and the remote execution environment",
        "version": env!("CARGO_PKG_VERSION"),
        "skills": skills,
    })
}
