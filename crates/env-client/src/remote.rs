//! Typed client over the remote task environment
//!
//! One client per base url. The endpoints mirror the environment's HTTP
//! surface: `/initialize`, `/execute`, `/task_completed`, `/evaluate`,
//! `/save` and `/close`. Timeouts are per endpoint; evaluation is by far
//! the slowest call. Some environment builds nest their payloads under an
//! `output` key, so responses are accepted in both shapes.

use std::time::Duration;

use reqwest::Response;
use serde::Serialize;
use serde_json::{json, Value};

use arena_core::task::{EvaluationResult, TaskRecord};
use arena_core::{Error, Result};

use crate::http::RetryingClient;

pub const INITIALIZE_TIMEOUT: Duration = Duration::from_secs(60);
pub const EXECUTE_TIMEOUT: Duration = Duration::from_secs(60);
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(10);
pub const EVALUATE_TIMEOUT: Duration = Duration::from_secs(180);
pub const SAVE_TIMEOUT: Duration = Duration::from_secs(10);
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response-body excerpt embedded in error messages
const BODY_EXCERPT_LIMIT: usize = 500;

/// Payload for the environment's initialize endpoint
#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    pub task_id: String,
    pub experiment_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_environment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_docker: Option<bool>,
}

/// Outcome of a completion check
#[derive(Debug, Clone)]
pub struct CompletionStatus {
    pub completed: bool,
    /// Whatever the environment returned alongside the flag
    pub detail: Value,
}

/// Client for a single remote environment
#[derive(Debug, Clone)]
pub struct EnvironmentClient {
    http: RetryingClient,
    base_url: String,
}

impl EnvironmentClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, RetryingClient::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: RetryingClient) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Initialize (or re-initialize) a task; safe to call repeatedly
    pub async fn initialize(&self, request: &InitializeRequest) -> Result<TaskRecord> {
        let body = serde_json::to_value(request)?;
        let response = self
            .http
            .post_json(&self.endpoint("initialize"), &body, INITIALIZE_TIMEOUT)
            .await?;

        if !response.status().is_success() {
            return Err(protocol_error("initialize failed", response).await);
        }

        let value = response.json::<Value>().await.unwrap_or(Value::Null);
        let record = unwrap_output(value, &["task_id", "instruction", "supervisor"]);
        Ok(serde_json::from_value(record).unwrap_or_default())
    }

    /// Run a code snippet inside the task's sandbox
    ///
    /// A JSON-object response yields its `output` field (empty string when
    /// absent); anything else comes back as the raw body text.
    pub async fn execute_code(&self, task_id: &str, code: &str) -> Result<Value> {
        let body = json!({ "task_id": task_id, "code": code });
        let response = self
            .http
            .post_json(&self.endpoint("execute"), &body, EXECUTE_TIMEOUT)
            .await?;

        if !response.status().is_success() {
            return Err(protocol_error("execution failed", response).await);
        }

        let raw = read_body(response).await?;
        Ok(match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(mut map)) => map
                .remove("output")
                .unwrap_or_else(|| Value::String(String::new())),
            _ => Value::String(raw),
        })
    }

    /// Ask whether the task's success condition is currently met
    pub async fn task_completed(&self, task_id: &str) -> Result<CompletionStatus> {
        let response = self
            .http
            .get(
                &self.endpoint("task_completed"),
                &[("task_id", task_id)],
                COMPLETION_TIMEOUT,
            )
            .await?;

        if !response.status().is_success() {
            return Err(protocol_error("completion check failed", response).await);
        }

        let raw = read_body(response).await?;
        let value: Value = serde_json::from_str(&raw).map_err(|_| {
            Error::Protocol(format!(
                "non-JSON response from /task_completed: {}",
                truncate_body(&raw)
            ))
        })?;

        let completed = value.get("completed").map(value_truthy).unwrap_or(false);
        Ok(CompletionStatus {
            completed,
            detail: value,
        })
    }

    /// Run the evaluator for a task
    pub async fn evaluate(
        &self,
        task_id: &str,
        experiment_name: Option<&str>,
    ) -> Result<EvaluationResult> {
        let mut body = json!({ "task_id": task_id, "suppress_errors": true });
        if let Some(experiment) = experiment_name {
            body["experiment_name"] = json!(experiment);
        }

        let response = self
            .http
            .post_json(&self.endpoint("evaluate"), &body, EVALUATE_TIMEOUT)
            .await?;

        if !response.status().is_success() {
            return Err(protocol_error("evaluation failed", response).await);
        }

        let value = response.json::<Value>().await.unwrap_or(Value::Null);
        let result = unwrap_output(value, &["passes", "failures"]);
        Ok(serde_json::from_value(result).unwrap_or_default())
    }

    /// Persist the sandbox state for a task
    pub async fn save(&self, task_id: &str) -> Result<()> {
        let body = json!({ "task_id": task_id });
        let response = self
            .http
            .post_json(&self.endpoint("save"), &body, SAVE_TIMEOUT)
            .await?;

        if !response.status().is_success() {
            return Err(protocol_error("save failed", response).await);
        }
        Ok(())
    }

    /// Release the task's environment
    pub async fn close(&self, task_id: &str) -> Result<()> {
        let body = json!({ "task_id": task_id });
        let response = self
            .http
            .post_json(&self.endpoint("close"), &body, CLOSE_TIMEOUT)
            .await?;

        if !response.status().is_success() {
            return Err(protocol_error("close failed", response).await);
        }
        Ok(())
    }
}

/// Descend into `output` when the expected keys only live there
fn unwrap_output(value: Value, expected_keys: &[&str]) -> Value {
    if let Value::Object(map) = &value {
        if !expected_keys.iter().any(|key| map.contains_key(*key)) {
            if let Some(nested @ Value::Object(_)) = map.get("output") {
                return nested.clone();
            }
        }
    }
    value
}

/// Python-style truthiness for loosely-typed `completed` flags
fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

async fn read_body(response: Response) -> Result<String> {
    response
        .text()
        .await
        .map_err(|err| Error::Protocol(format!("failed to read response body: {}", err)))
}

async fn protocol_error(context: &str, response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_else(|_| String::new());
    Error::Protocol(format!("{}: {} {}", context, status, truncate_body(&body)))
}

/// Clamp a body excerpt to at most 500 characters, on a char boundary
fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_LIMIT {
        trimmed.to_string()
    } else {
        trimmed.chars().take(BODY_EXCERPT_LIMIT).collect()
    }
}
