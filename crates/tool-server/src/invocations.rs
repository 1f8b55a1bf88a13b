//! Append-only log of tool invocations
//!
//! Every tool call lands as one JSON line in
//! `<data_dir>/tool_invocations.jsonl`, for offline analysis only; nothing
//! in the server reads it back. Append failures are logged and swallowed so
//! the log can never break a tool call.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// One tool call, as persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub timestamp: DateTime<Utc>,
    pub tool_name: String,
    pub arguments: Value,
    /// Decoded envelope, present only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: f64,
}

impl InvocationRecord {
    /// Build a record from the envelope string a tool handler returned
    pub fn from_envelope(
        tool_name: &str,
        arguments: Value,
        envelope: &str,
        duration: Duration,
    ) -> Self {
        let decoded: Value = serde_json::from_str(envelope).unwrap_or(Value::Null);
        let success = decoded.get("ok").and_then(Value::as_bool).unwrap_or(false);
        let error = if success {
            None
        } else {
            Some(
                decoded
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            )
        };

        Self {
            timestamp: Utc::now(),
            tool_name: tool_name.to_string(),
            arguments,
            result: success.then_some(decoded),
            success,
            error,
            duration_ms: duration.as_secs_f64() * 1000.0,
        }
    }
}

/// JSONL invocation log under the server's data directory
pub struct InvocationLog {
    path: PathBuf,
}

impl InvocationLog {
    pub fn new(data_dir: &Path) -> arena_core::Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            path: data_dir.join("tool_invocations.jsonl"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record; failures are warned about, never surfaced
    pub fn record(&self, record: &InvocationRecord) {
        if let Err(err) = self.append(record) {
            warn!(
                "Failed to append invocation of {} to {}: {}",
                record.tool_name,
                self.path.display(),
                err
            );
        }
    }

    fn append(&self, record: &InvocationRecord) -> std::io::Result<()> {
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn read_records(log: &InvocationLog) -> Vec<InvocationRecord> {
        std::fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn success_records_carry_the_decoded_result() {
        let record = InvocationRecord::from_envelope(
            "next_task",
            json!({}),
            r#"{ "ok": true, "task_id": "t1" }"#,
            Duration::from_millis(12),
        );

        assert!(record.success);
        assert!(record.error.is_none());
        assert_eq!(record.result.as_ref().unwrap()["task_id"], json!("t1"));
        assert!(record.duration_ms >= 12.0);
    }

    #[test]
    fn failure_records_carry_the_error_message() {
        let record = InvocationRecord::from_envelope(
            "next_task",
            json!({}),
            r#"{"ok":false,"kind":"drained","error":"no more tasks"}"#,
            Duration::from_millis(1),
        );

        assert!(!record.success);
        assert!(record.result.is_none());
        assert_eq!(record.error.as_deref(), Some("no more tasks"));
    }

    #[test]
    fn appends_one_line_per_call() {
        let temp = TempDir::new().unwrap();
        let log = InvocationLog::new(temp.path()).unwrap();

        log.record(&InvocationRecord::from_envelope(
            "setup_environment",
            json!({ "split": "dev" }),
            r#"{ "ok": true, "num_tasks": 3 }"#,
            Duration::from_millis(5),
        ));
        log.record(&InvocationRecord::from_envelope(
            "next_task",
            json!({}),
            r#"{"ok":false,"kind":"drained","error":"no more tasks"}"#,
            Duration::from_millis(2),
        ));

        let records = read_records(&log);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tool_name, "setup_environment");
        assert!(records[0].success);
        assert_eq!(records[1].error.as_deref(), Some("no more tasks"));
    }

    #[test]
    fn creates_the_data_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("deep").join("data");

        let log = InvocationLog::new(&nested).unwrap();
        log.record(&InvocationRecord::from_envelope(
            "close_session",
            json!({}),
            r#"{ "ok": true }"#,
            Duration::ZERO,
        ));

        assert_eq!(read_records(&log).len(), 1);
    }
}
