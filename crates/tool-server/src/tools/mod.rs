//! Tool registry and dispatch
//!
//! Every operation the agents can invoke is a variant of [`ToolName`];
//! dispatch is an exhaustive match, so a variant without a handler fails to
//! compile. Handlers always return an envelope string: failures are data
//! handed back to the agent, never HTTP errors.

pub mod blue;
pub mod green;

use serde::de::DeserializeOwned;
use serde_json::Value;

use arena_core::{Error, Result};

use crate::state::AppState;

/// Registered tool names, green side first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    SetupEnvironment,
    NextTask,
    RunEvaluation,
    ConnectSandbox,
    ExecuteCode,
    CheckCompletion,
    SaveSession,
    CloseSession,
}

impl ToolName {
    pub const ALL: [ToolName; 8] = [
        ToolName::SetupEnvironment,
        ToolName::NextTask,
        ToolName::RunEvaluation,
        ToolName::ConnectSandbox,
        ToolName::ExecuteCode,
        ToolName::CheckCompletion,
        ToolName::SaveSession,
        ToolName::CloseSession,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SetupEnvironment => "setup_environment",
            ToolName::NextTask => "next_task",
            ToolName::RunEvaluation => "run_evaluation",
            ToolName::ConnectSandbox => "connect_sandbox",
            ToolName::ExecuteCode => "execute_code",
            ToolName::CheckCompletion => "check_completion",
            ToolName::SaveSession => "save_session",
            ToolName::CloseSession => "close_session",
        }
    }

    pub fn parse(name: &str) -> Option<ToolName> {
        Self::ALL.iter().copied().find(|tool| tool.as_str() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::SetupEnvironment => {
                "Configure the session and fill the task queue from a dataset split"
            }
            ToolName::NextTask => "Pop the next task id and initialize its remote environment",
            ToolName::RunEvaluation => "Evaluate a task and close its environment",
            ToolName::ConnectSandbox => "Initialize the remote sandbox for a handed-out task",
            ToolName::ExecuteCode => "Run a code snippet inside the task's sandbox",
            ToolName::CheckCompletion => "Ask whether the task's success condition is met",
            ToolName::SaveSession => "Persist the sandbox state for a task",
            ToolName::CloseSession => "Release the task's remote environment",
        }
    }
}

/// Run one tool call and encode its outcome as an envelope string
pub async fn dispatch(state: &AppState, tool: ToolName, arguments: Value) -> String {
    match tool {
        ToolName::SetupEnvironment => green::setup_environment(state, arguments).await,
        ToolName::NextTask => green::next_task(state, arguments).await,
        ToolName::RunEvaluation => green::run_evaluation(state, arguments).await,
        ToolName::ConnectSandbox => blue::connect_sandbox(state, arguments).await,
        ToolName::ExecuteCode => blue::execute_code(state, arguments).await,
        ToolName::CheckCompletion => blue::check_completion(state, arguments).await,
        ToolName::SaveSession => blue::save_session(state, arguments).await,
        ToolName::CloseSession => blue::close_session(state, arguments).await,
    }
}

/// Decode a flat argument object, mapping serde errors to `InvalidArgs`
fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|err| Error::InvalidArgs(err.to_string()))
}
