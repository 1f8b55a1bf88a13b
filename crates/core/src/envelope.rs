//! JSON result envelopes for tool responses
//!
//! Every tool invocation returns a JSON object string with an `ok` flag.
//! Success payloads are pretty-printed for agent readability; failure
//! payloads are compact one-liners carrying a stable `kind` and a human
//! message. Failures are always encoded, never propagated to the caller.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::Error;

const FALLBACK: &str = r#"{"ok":false,"kind":"internal","error":"failed to encode envelope"}"#;

/// Encode `{"ok": true, ...payload}`, pretty-printed
pub fn success<T: Serialize>(payload: &T) -> String {
    let mut object = to_object(payload);
    object.insert("ok".to_string(), Value::Bool(true));
    serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_else(|_| FALLBACK.to_string())
}

/// Encode `{"ok": false, "kind": ..., "error": ...}`, compact
pub fn failure(error: &Error) -> String {
    failure_with(error, &Value::Null)
}

/// Failure envelope with extra fields merged in (e.g. `completed: false`)
pub fn failure_with<T: Serialize>(error: &Error, extra: &T) -> String {
    let mut object = to_object(extra);
    object.insert("ok".to_string(), Value::Bool(false));
    object.insert(
        "kind".to_string(),
        serde_json::to_value(error.kind()).unwrap_or(Value::Null),
    );
    object.insert("error".to_string(), Value::String(error.to_string()));
    serde_json::to_string(&Value::Object(object)).unwrap_or_else(|_| FALLBACK.to_string())
}

/// Coerce a payload into a JSON object; non-object payloads land under `output`
fn to_object<T: Serialize>(payload: &T) -> Map<String, Value> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) | Err(_) => Map::new(),
        Ok(other) => {
            let mut map = Map::new();
            map.insert("output".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Error;

    #[test]
    fn success_is_pretty_printed() {
        let encoded = success(&json!({ "task_id": "t1", "num_tasks": 3 }));

        assert!(encoded.contains('\n'));
        let parsed: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed["ok"], json!(true));
        assert_eq!(parsed["task_id"], json!("t1"));
        assert_eq!(parsed["num_tasks"], json!(3));
    }

    #[test]
    fn failure_is_compact_with_kind_and_error() {
        let encoded = failure(&Error::Drained);

        assert!(!encoded.contains('\n'));
        let parsed: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed["ok"], json!(false));
        assert_eq!(parsed["kind"], json!("drained"));
        assert_eq!(parsed["error"], json!("no more tasks"));
    }

    #[test]
    fn failure_with_merges_extra_fields() {
        let err = Error::Protocol("completion check failed: 500 boom".to_string());
        let encoded = failure_with(&err, &json!({ "completed": false }));

        let parsed: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed["ok"], json!(false));
        assert_eq!(parsed["kind"], json!("protocol"));
        assert_eq!(parsed["completed"], json!(false));
        assert!(parsed["error"].as_str().unwrap().contains("boom"));
    }

    #[test]
    fn every_failure_kind_serializes_to_snake_case() {
        let cases = [
            (Error::Config("x".into()), "config"),
            (Error::Transport("x".into()), "transport"),
            (Error::Protocol("x".into()), "protocol"),
            (Error::Drained, "drained"),
            (Error::InvalidArgs("x".into()), "invalid_args"),
        ];

        for (err, kind) in cases {
            let parsed: Value = serde_json::from_str(&failure(&err)).unwrap();
            assert_eq!(parsed["kind"], json!(kind));
        }
    }

    #[test]
    fn non_object_payload_lands_under_output() {
        let encoded = success(&json!([1, 2, 3]));
        let parsed: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed["ok"], json!(true));
        assert_eq!(parsed["output"], json!([1, 2, 3]));
    }
}
