//! Blue-side tools: direct sandbox operations
//!
//! Each call carries the `sandbox` hand-off record the green side produced,
//! so the blue agent can address the right remote session without any shared
//! state of its own.

use serde::Deserialize;
use serde_json::{json, Value};

use arena_core::envelope;
use arena_core::task::SandboxAccess;
use arena_core::{Error, Result};
use env_client::remote::InitializeRequest;

use crate::state::AppState;

use super::parse_args;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SandboxArgs {
    sandbox: SandboxAccess,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExecuteArgs {
    sandbox: SandboxAccess,
    code: String,
}

fn validate(sandbox: &SandboxAccess) -> Result<()> {
    if sandbox.remote_environment_url.is_empty() {
        return Err(Error::InvalidArgs(
            "sandbox.remote_environment_url must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// `connect_sandbox`: (re-)initialize the remote environment for a task
pub async fn connect_sandbox(state: &AppState, arguments: Value) -> String {
    let args: SandboxArgs = match parse_args(arguments) {
        Ok(args) => args,
        Err(err) => return envelope::failure(&err),
    };
    let sandbox = args.sandbox;
    if let Err(err) = validate(&sandbox) {
        return envelope::failure_with(&err, &json!({ "task_id": sandbox.task_id }));
    }

    let client = state.environment_client(&sandbox.remote_environment_url);
    let request = InitializeRequest {
        task_id: sandbox.task_id.clone(),
        experiment_name: sandbox.experiment_name.clone(),
        remote_environment_url: Some(sandbox.remote_environment_url.clone()),
        remote_docker: Some(sandbox.remote_docker),
    };

    match client.initialize(&request).await {
        Ok(record) => envelope::success(&json!({
            "task_id": sandbox.task_id,
            "instruction": record.instruction,
            "supervisor": record.supervisor,
            "datetime": record.datetime,
        })),
        Err(err) => envelope::failure_with(&err, &json!({ "task_id": sandbox.task_id })),
    }
}

/// `execute_code`: run a snippet inside the task's sandbox
pub async fn execute_code(state: &AppState, arguments: Value) -> String {
    let args: ExecuteArgs = match parse_args(arguments) {
        Ok(args) => args,
        Err(err) => return envelope::failure(&err),
    };
    if let Err(err) = validate(&args.sandbox) {
        return envelope::failure(&err);
    }

    let client = state.environment_client(&args.sandbox.remote_environment_url);
    match client.execute_code(&args.sandbox.task_id, &args.code).await {
        Ok(output) => envelope::success(&json!({
            "task_id": args.sandbox.task_id,
            "output": output,
        })),
        Err(err) => envelope::failure(&err),
    }
}

/// `check_completion`: poll the task's success condition
///
/// A transport or shape failure still carries `completed: false`, so callers
/// that only look at the flag keep polling.
pub async fn check_completion(state: &AppState, arguments: Value) -> String {
    let args: SandboxArgs = match parse_args(arguments) {
        Ok(args) => args,
        Err(err) => return envelope::failure_with(&err, &json!({ "completed": false })),
    };
    if let Err(err) = validate(&args.sandbox) {
        return envelope::failure_with(&err, &json!({ "completed": false }));
    }

    let client = state.environment_client(&args.sandbox.remote_environment_url);
    match client.task_completed(&args.sandbox.task_id).await {
        Ok(status) => envelope::success(&json!({
            "task_id": args.sandbox.task_id,
            "completed": status.completed,
            "detail": status.detail,
        })),
        Err(err) => envelope::failure_with(&err, &json!({ "completed": false })),
    }
}

/// `save_session`: persist the sandbox state
pub async fn save_session(state: &AppState, arguments: Value) -> String {
    let args: SandboxArgs = match parse_args(arguments) {
        Ok(args) => args,
        Err(err) => return envelope::failure(&err),
    };
    if let Err(err) = validate(&args.sandbox) {
        return envelope::failure(&err);
    }

    let client = state.environment_client(&args.sandbox.remote_environment_url);
    match client.save(&args.sandbox.task_id).await {
        Ok(()) => envelope::success(&json!({ "task_id": args.sandbox.task_id, "saved": true })),
        Err(err) => envelope::failure(&err),
    }
}

/// `close_session`: release the task's remote environment
pub async fn close_session(state: &AppState, arguments: Value) -> String {
    let args: SandboxArgs = match parse_args(arguments) {
        Ok(args) => args,
        Err(err) => return envelope::failure(&err),
    };
    if let Err(err) = validate(&args.sandbox) {
        return envelope::failure(&err);
    }

    let client = state.environment_client(&args.sandbox.remote_environment_url);
    match client.close(&args.sandbox.task_id).await {
        Ok(()) => envelope::success(&json!({ "task_id": args.sandbox.task_id, "closed": true })),
        Err(err) => envelope::failure(&err),
    }
}
