//! Application state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use arena_core::queue::TaskQueue;
use arena_core::session::SessionHandle;
use env_client::{EnvironmentClient, RetryPolicy, RetryingClient, TaskCoordinator};

use crate::card;
use crate::invocations::InvocationLog;

/// Server configuration read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub card_path: Option<PathBuf>,
    /// Dataset root used when `setup_environment` does not provide one
    pub task_root: Option<PathBuf>,
    /// Battle id used when `setup_environment` does not provide one
    pub battle_id: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("ARENA_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8090".to_string()),
            data_dir: std::env::var("ARENA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".arena-data")),
            card_path: std::env::var("ARENA_CARD_PATH").ok().map(PathBuf::from),
            task_root: std::env::var("ARENA_TASK_ROOT").ok().map(PathBuf::from),
            battle_id: std::env::var("ARENA_BATTLE_ID").ok(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    coordinator: TaskCoordinator,
    invocations: InvocationLog,
    card: Value,
    policy: RetryPolicy,
}

impl AppState {
    /// Create a new AppState with the given server configuration
    pub fn new(config: ServerConfig) -> arena_core::Result<Self> {
        Self::with_policy(config, RetryPolicy::default())
    }

    /// Same, with an explicit HTTP retry schedule
    pub fn with_policy(config: ServerConfig, policy: RetryPolicy) -> arena_core::Result<Self> {
        let invocations = InvocationLog::new(&config.data_dir)?;
        let card = card::load(config.card_path.as_deref());
        let coordinator =
            TaskCoordinator::new(Arc::new(SessionHandle::new()), Arc::new(TaskQueue::new()))
                .with_policy(policy);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                coordinator,
                invocations,
                card,
                policy,
            }),
        })
    }

    pub fn coordinator(&self) -> &TaskCoordinator {
        &self.inner.coordinator
    }

    pub fn invocations(&self) -> &InvocationLog {
        &self.inner.invocations
    }

    pub fn card(&self) -> &Value {
        &self.inner.card
    }

    pub fn default_task_root(&self) -> Option<&Path> {
        self.inner.config.task_root.as_deref()
    }

    pub fn default_battle_id(&self) -> Option<&str> {
        self.inner.config.battle_id.as_deref()
    }

    /// Client for a sandbox addressed by the blue-side tools
    pub fn environment_client(&self, base_url: &str) -> EnvironmentClient {
        EnvironmentClient::with_client(base_url, RetryingClient::with_policy(self.inner.policy))
    }
}
