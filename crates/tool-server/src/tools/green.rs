//! Green-side tools: session setup, task hand-out, evaluation

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use arena_core::envelope;
use arena_core::task::SandboxAccess;
use env_client::lifecycle::{EvaluateRequest, SetupRequest};

use crate::state::AppState;

use super::parse_args;

/// Battle id when neither the request nor the environment names one
const FALLBACK_BATTLE_ID: &str = "unknown-battle-id";

fn default_experiment_name() -> String {
    "default".to_string()
}

fn default_split() -> String {
    "dev".to_string()
}

fn default_remote_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_remote_docker() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetupArgs {
    #[serde(default)]
    root: Option<PathBuf>,
    #[serde(default = "default_experiment_name")]
    experiment_name: String,
    #[serde(default = "default_split")]
    split: String,
    #[serde(default)]
    battle_id: Option<String>,
    #[serde(default = "default_remote_url")]
    remote_environment_url: String,
    #[serde(default = "default_remote_docker")]
    remote_docker: bool,
    #[serde(default)]
    scenario_filter: Option<Vec<String>>,
    #[serde(default)]
    max_tasks: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NextTaskArgs {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunEvaluationArgs {
    task_id: String,
    #[serde(default)]
    sandbox: Option<SandboxAccess>,
}

/// `setup_environment`: configure the session and refill the task queue
pub async fn setup_environment(state: &AppState, arguments: Value) -> String {
    let args: SetupArgs = match parse_args(arguments) {
        Ok(args) => args,
        Err(err) => return envelope::failure(&err),
    };

    let request = SetupRequest {
        root: args
            .root
            .or_else(|| state.default_task_root().map(PathBuf::from)),
        experiment_name: args.experiment_name,
        split: args.split,
        battle_id: args
            .battle_id
            .or_else(|| state.default_battle_id().map(str::to_string))
            .unwrap_or_else(|| FALLBACK_BATTLE_ID.to_string()),
        remote_environment_url: args.remote_environment_url,
        remote_docker: args.remote_docker,
        scenario_filter: args.scenario_filter,
        max_tasks: args.max_tasks,
    };

    match state.coordinator().setup(request).await {
        Ok(summary) => envelope::success(&summary),
        Err(err) => envelope::failure(&err),
    }
}

/// `next_task`: hand the next task id to the solving agent
pub async fn next_task(state: &AppState, arguments: Value) -> String {
    if let Err(err) = parse_args::<NextTaskArgs>(arguments) {
        return envelope::failure(&err);
    }

    match state.coordinator().next_task().await {
        Ok(assignment) => envelope::success(&assignment),
        Err(err) => envelope::failure(&err),
    }
}

/// `run_evaluation`: evaluate a task, always closing its environment
pub async fn run_evaluation(state: &AppState, arguments: Value) -> String {
    let args: RunEvaluationArgs = match parse_args(arguments) {
        Ok(args) => args,
        Err(err) => return envelope::failure(&err),
    };

    let request = EvaluateRequest {
        task_id: args.task_id,
        sandbox: args.sandbox,
    };

    match state.coordinator().evaluate(request).await {
        Ok(report) => envelope::success(&report),
        Err(err) => envelope::failure(&err),
    }
}
