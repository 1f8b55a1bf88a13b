//! Task records, sandbox hand-off data and evaluation results

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Task metadata returned by the remote environment
///
/// Parsed leniently: the remote omits fields freely, and validation happens
/// at hand-off time via [`TaskRecord::missing_fields`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub supervisor: Option<Value>,
    #[serde(default)]
    pub datetime: Option<String>,
}

impl TaskRecord {
    /// Required hand-off fields that are absent, null or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.instruction.as_deref().unwrap_or("").is_empty() {
            missing.push("instruction");
        }
        match &self.supervisor {
            None | Some(Value::Null) => missing.push("supervisor"),
            Some(Value::String(s)) if s.is_empty() => missing.push("supervisor"),
            _ => {}
        }
        missing
    }
}

/// Everything the solving agent needs to drive one task's sandbox
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxAccess {
    pub remote_environment_url: String,
    #[serde(default = "default_remote_docker")]
    pub remote_docker: bool,
    #[serde(default = "default_experiment_name")]
    pub experiment_name: String,
    #[serde(default)]
    pub task_id: String,
}

fn default_remote_docker() -> bool {
    true
}

fn default_experiment_name() -> String {
    "default".to_string()
}

/// Pass/fail breakdown returned by the remote evaluator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(default)]
    pub passes: Vec<Value>,
    #[serde(default)]
    pub failures: Vec<Value>,
}

impl EvaluationResult {
    pub fn tests_passed(&self) -> usize {
        self.passes.len()
    }

    pub fn tests_total(&self) -> usize {
        self.passes.len() + self.failures.len()
    }

    /// Human-readable report for this result
    pub fn report(&self, task_id: &str) -> String {
        format!(
            "Task {} Evaluation Report\n\
             ----------------------------------\n\
             Num Passed Tests : {}\n\
             Num Failed Tests : {}\n\
             Num Total  Tests : {}\n",
            task_id,
            self.tests_passed(),
            self.failures.len(),
            self.tests_total(),
        )
    }
}
