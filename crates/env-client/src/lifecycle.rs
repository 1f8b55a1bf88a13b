//! Task lifecycle coordination
//!
//! The coordinator owns the green side of the protocol: configuring a
//! session, handing tasks out one at a time, and running evaluation with a
//! guaranteed close at the end. Setup replaces the session before refilling
//! the queue; a hand-out racing a reset may still see an id from the
//! outgoing roster.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use arena_core::dataset;
use arena_core::queue::TaskQueue;
use arena_core::session::{SessionConfig, SessionHandle};
use arena_core::task::SandboxAccess;
use arena_core::{Error, Result};

use crate::http::{RetryPolicy, RetryingClient};
use crate::remote::{EnvironmentClient, InitializeRequest};

/// Arguments for configuring (or fully resetting) a session
#[derive(Debug, Clone)]
pub struct SetupRequest {
    pub root: Option<PathBuf>,
    pub experiment_name: String,
    pub split: String,
    pub battle_id: String,
    pub remote_environment_url: String,
    pub remote_docker: bool,
    pub scenario_filter: Option<Vec<String>>,
    pub max_tasks: Option<usize>,
}

/// What setup reports back
#[derive(Debug, Clone, Serialize)]
pub struct SetupSummary {
    pub root: String,
    pub experiment: String,
    pub split: String,
    pub battle_id: String,
    pub remote_environment_url: String,
    pub remote_docker: bool,
    pub num_tasks: usize,
    /// First few queued ids, as a sanity check for the caller
    pub example_ids: Vec<String>,
}

/// A task handed to the solving agent
#[derive(Debug, Clone, Serialize)]
pub struct TaskAssignment {
    pub task_id: String,
    pub instruction: String,
    pub supervisor: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    /// Hand-off record the solver passes back to the sandbox tools
    pub sandbox: SandboxAccess,
}

/// Arguments for running evaluation
#[derive(Debug, Clone)]
pub struct EvaluateRequest {
    pub task_id: String,
    /// Sandbox from the hand-out; falls back to the session when absent
    pub sandbox: Option<SandboxAccess>,
}

/// Outcome of an evaluation run
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub task_id: String,
    pub tests_passed: usize,
    pub tests_total: usize,
    pub report: String,
    pub passes: Vec<Value>,
    pub failures: Vec<Value>,
}

/// Green-side orchestrator: session setup, task hand-out, evaluation
pub struct TaskCoordinator {
    session: Arc<SessionHandle>,
    queue: Arc<TaskQueue>,
    policy: RetryPolicy,
}

impl TaskCoordinator {
    pub fn new(session: Arc<SessionHandle>, queue: Arc<TaskQueue>) -> Self {
        Self {
            session,
            queue,
            policy: RetryPolicy::default(),
        }
    }

    /// Override the HTTP retry schedule
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn client_for(&self, base_url: &str) -> EnvironmentClient {
        EnvironmentClient::with_client(base_url, RetryingClient::with_policy(self.policy))
    }

    /// Configure the session and refill the task queue
    ///
    /// Each call is a full reset: previous configuration and any queued ids
    /// are discarded.
    pub async fn setup(&self, request: SetupRequest) -> Result<SetupSummary> {
        let root = request
            .root
            .ok_or_else(|| Error::Config("task root not provided".to_string()))?;

        let ids = dataset::load_task_ids(&root, &request.split).await?;
        let ids = dataset::filter_task_ids(
            ids,
            request.scenario_filter.as_deref(),
            request.max_tasks,
        );

        let config = SessionConfig {
            root_path: Some(root.clone()),
            experiment_name: request.experiment_name,
            split: request.split,
            battle_id: request.battle_id,
            remote_environment_url: request.remote_environment_url,
            remote_docker: request.remote_docker,
        };

        self.session.replace(config.clone()).await;
        self.queue.replace(ids.clone()).await;

        info!(
            "Session configured: split={} tasks={} experiment={} remote={}",
            config.split,
            ids.len(),
            config.experiment_name,
            config.remote_environment_url
        );

        Ok(SetupSummary {
            root: root.display().to_string(),
            experiment: config.experiment_name,
            split: config.split,
            battle_id: config.battle_id,
            remote_environment_url: config.remote_environment_url,
            remote_docker: config.remote_docker,
            num_tasks: ids.len(),
            example_ids: ids.into_iter().take(3).collect(),
        })
    }

    /// Pop the next task id and initialize it on the remote environment
    pub async fn next_task(&self) -> Result<TaskAssignment> {
        let config = self.session.require().await?;
        let task_id = self.queue.pop().await.ok_or(Error::Drained)?;

        let client = self.client_for(&config.remote_environment_url);
        let record = client
            .initialize(&InitializeRequest {
                task_id: task_id.clone(),
                experiment_name: config.experiment_name.clone(),
                remote_environment_url: None,
                remote_docker: Some(config.remote_docker),
            })
            .await?;

        let missing = record.missing_fields();
        if !missing.is_empty() {
            return Err(Error::Protocol(format!(
                "bad task metadata for {}: missing required fields: {}",
                task_id,
                missing.join(", ")
            )));
        }

        info!("Handing out task {}", task_id);

        Ok(TaskAssignment {
            task_id: task_id.clone(),
            instruction: record.instruction.unwrap_or_default(),
            supervisor: record.supervisor.unwrap_or(Value::Null),
            datetime: record.datetime,
            sandbox: SandboxAccess {
                remote_environment_url: config.remote_environment_url,
                remote_docker: config.remote_docker,
                experiment_name: config.experiment_name,
                task_id,
            },
        })
    }

    /// Evaluate a task, then close its environment no matter what
    pub async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluationReport> {
        let (base_url, experiment_name, remote_docker) = match request.sandbox {
            Some(sandbox) if !sandbox.remote_environment_url.is_empty() => (
                sandbox.remote_environment_url,
                sandbox.experiment_name,
                sandbox.remote_docker,
            ),
            _ => {
                let config = self.session.require().await?;
                (
                    config.remote_environment_url,
                    config.experiment_name,
                    config.remote_docker,
                )
            }
        };

        let client = self.client_for(&base_url);
        let outcome = self
            .run_evaluation(&client, &request.task_id, &experiment_name, remote_docker)
            .await;

        // The environment must be released even when evaluation failed.
        self.close_quietly(&client, &request.task_id).await;

        outcome
    }

    async fn run_evaluation(
        &self,
        client: &EnvironmentClient,
        task_id: &str,
        experiment_name: &str,
        remote_docker: bool,
    ) -> Result<EvaluationReport> {
        // Re-initialize first; the endpoint is idempotent for open tasks.
        client
            .initialize(&InitializeRequest {
                task_id: task_id.to_string(),
                experiment_name: experiment_name.to_string(),
                remote_environment_url: None,
                remote_docker: Some(remote_docker),
            })
            .await?;

        let result = client.evaluate(task_id, Some(experiment_name)).await?;
        let report = result.report(task_id);
        info!("{}", report);

        Ok(EvaluationReport {
            task_id: task_id.to_string(),
            tests_passed: result.tests_passed(),
            tests_total: result.tests_total(),
            report,
            passes: result.passes,
            failures: result.failures,
        })
    }

    async fn close_quietly(&self, client: &EnvironmentClient, task_id: &str) {
        if let Err(err) = client.close(task_id).await {
            warn!("Failed to close task {}: {}", task_id, err);
        }
    }
}
