//! HTTP transport with bounded retry and exponential backoff
//!
//! All traffic to the remote environment goes through this client. Network
//! errors and a fixed set of transient statuses are retried with doubling
//! delays; any other response is handed back untouched, so status handling
//! stays with the caller.

use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::warn;

use arena_core::{Error, Result};

/// Statuses worth retrying: rate limiting and transient gateway failures
const RETRYABLE_STATUS: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Per-request timeout when a call site does not override it
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry schedule: how many attempts to make and how the delays grow
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per logical request, first try included
    pub max_attempts: u32,
    /// Delay before the first retry; doubles for every retry after that
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(800),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after `completed_attempts` failed attempts (1-based)
    pub fn backoff_delay(&self, completed_attempts: u32) -> Duration {
        let exponent = completed_attempts.saturating_sub(1).min(16);
        self.backoff_base * 2u32.pow(exponent)
    }
}

/// Client wrapper applying the retry policy to every request
#[derive(Debug, Clone)]
pub struct RetryingClient {
    client: Client,
    policy: RetryPolicy,
}

impl Default for RetryingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryingClient {
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            // Disable proxy for direct environment traffic
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// GET with query parameters
    pub async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Response> {
        self.execute(Method::GET, url, Some(query), None, timeout)
            .await
    }

    /// POST with a JSON body
    pub async fn post_json(&self, url: &str, body: &Value, timeout: Duration) -> Result<Response> {
        self.execute(Method::POST, url, None, Some(body), timeout)
            .await
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
        timeout: Duration,
    ) -> Result<Response> {
        let mut last_failure = String::new();

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.policy.backoff_delay(attempt - 1)).await;
            }

            let mut request = self.client.request(method.clone(), url).timeout(timeout);
            if let Some(query) = query {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) if RETRYABLE_STATUS.contains(&response.status()) => {
                    last_failure = format!("HTTP {}", response.status().as_u16());
                    warn!(
                        "{} {} returned {} (attempt {}/{})",
                        method,
                        url,
                        response.status(),
                        attempt,
                        self.policy.max_attempts
                    );
                }
                Ok(response) => return Ok(response),
                Err(err) => {
                    last_failure = err.to_string();
                    warn!(
                        "{} {} failed: {} (attempt {}/{})",
                        method, url, err, attempt, self.policy.max_attempts
                    );
                }
            }
        }

        Err(Error::Transport(format!(
            "{} {} failed after {} attempts: {}",
            method, url, self.policy.max_attempts, last_failure
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    use axum::extract::State;
    use axum::routing::any;
    use axum::Router;
    use serde_json::json;

    use super::*;

    #[derive(Clone)]
    struct ScriptedServer {
        hits: Arc<AtomicUsize>,
        statuses: Arc<Vec<StatusCode>>,
    }

    async fn respond(State(server): State<ScriptedServer>) -> StatusCode {
        let hit = server.hits.fetch_add(1, Ordering::SeqCst);
        *server
            .statuses
            .get(hit)
            .or_else(|| server.statuses.last())
            .unwrap()
    }

    /// Serve a fixed status sequence on an ephemeral port; the last status
    /// repeats once the script is exhausted.
    async fn spawn_scripted_server(statuses: Vec<StatusCode>) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let server = ScriptedServer {
            hits: Arc::clone(&hits),
            statuses: Arc::new(statuses),
        };
        let app = Router::new()
            .route("/probe", any(respond))
            .with_state(server);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/probe", addr), hits)
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            backoff_base: Duration::from_millis(5),
        }
    }

    #[test]
    fn backoff_delays_double_from_the_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(800));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(1600));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(3200));
    }

    #[test]
    fn backoff_respects_a_custom_base() {
        let policy = RetryPolicy {
            max_attempts: 5,
            backoff_base: Duration::from_millis(100),
        };
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(4), Duration::from_millis(800));
    }

    #[tokio::test]
    async fn retries_transient_statuses_until_success() {
        let (url, hits) = spawn_scripted_server(vec![
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::OK,
        ])
        .await;

        let client = RetryingClient::with_policy(fast_policy());
        let started = Instant::now();
        let response = client
            .post_json(&url, &json!({}), DEFAULT_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        // two delays: 5ms + 10ms
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[tokio::test]
    async fn gives_up_after_the_attempt_budget() {
        let (url, hits) = spawn_scripted_server(vec![StatusCode::SERVICE_UNAVAILABLE]).await;

        let client = RetryingClient::with_policy(fast_policy());
        let err = client
            .get(&url, &[], DEFAULT_TIMEOUT)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert!(err.to_string().contains("after 3 attempts"));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_statuses_pass_through_untouched() {
        let (url, hits) = spawn_scripted_server(vec![StatusCode::NOT_FOUND]).await;

        let client = RetryingClient::with_policy(fast_policy());
        let response = client
            .get(&url, &[("task_id", "t1")], DEFAULT_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn network_errors_are_retried_then_reported() {
        // Grab a port and release it so connections get refused.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/probe", listener.local_addr().unwrap());
        drop(listener);

        let client = RetryingClient::with_policy(RetryPolicy {
            max_attempts: 2,
            backoff_base: Duration::from_millis(1),
        });
        let err = client
            .post_json(&url, &json!({}), DEFAULT_TIMEOUT)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert!(err.to_string().contains("after 2 attempts"));
    }
}
