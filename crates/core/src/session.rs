//! Session configuration shared between tools
//!
//! A session captures everything established during setup: where the dataset
//! lives, which experiment is running, and how to reach the remote
//! environment. State lives behind an explicit handle cloned via `Arc`;
//! there are no globals.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{Error, Result};

/// Configuration established by the setup tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Local dataset root, when tasks are read from disk
    pub root_path: Option<PathBuf>,
    pub experiment_name: String,
    pub split: String,
    pub battle_id: String,
    pub remote_environment_url: String,
    pub remote_docker: bool,
}

/// Shared handle to the (possibly unset) session configuration
#[derive(Debug, Default)]
pub struct SessionHandle {
    config: RwLock<Option<SessionConfig>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session with a freshly configured one
    pub async fn replace(&self, config: SessionConfig) {
        *self.config.write().await = Some(config);
    }

    /// Current configuration, if any
    pub async fn snapshot(&self) -> Option<SessionConfig> {
        self.config.read().await.clone()
    }

    /// Current configuration, or a configuration error when setup has not run
    pub async fn require(&self) -> Result<SessionConfig> {
        match self.snapshot().await {
            Some(config) if !config.remote_environment_url.is_empty() => Ok(config),
            _ => Err(Error::Config(
                "session not configured; call setup_environment first".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> SessionConfig {
        SessionConfig {
            root_path: None,
            experiment_name: "exp-1".to_string(),
            split: "dev".to_string(),
            battle_id: "battle-1".to_string(),
            remote_environment_url: "http://127.0.0.1:8000".to_string(),
            remote_docker: true,
        }
    }

    #[tokio::test]
    async fn require_fails_before_setup() {
        let handle = SessionHandle::new();

        let err = handle.require().await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("setup_environment"));
    }

    #[tokio::test]
    async fn require_returns_config_after_replace() {
        let handle = SessionHandle::new();
        handle.replace(sample_config()).await;

        let config = handle.require().await.unwrap();
        assert_eq!(config.split, "dev");
        assert_eq!(config.remote_environment_url, "http://127.0.0.1:8000");
    }

    #[tokio::test]
    async fn require_rejects_empty_remote_url() {
        let handle = SessionHandle::new();
        let mut config = sample_config();
        config.remote_environment_url = String::new();
        handle.replace(config).await;

        assert!(handle.require().await.is_err());
    }

    #[tokio::test]
    async fn replace_overwrites_previous_session() {
        let handle = SessionHandle::new();
        handle.replace(sample_config()).await;

        let mut next = sample_config();
        next.split = "test_normal".to_string();
        handle.replace(next).await;

        let config = handle.require().await.unwrap();
        assert_eq!(config.split, "test_normal");
    }
}
