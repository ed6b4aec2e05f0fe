//! Success and failure envelopes.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{ToolError, ToolResult};

/// Keys whose values are never echoed back.
const REDACTED_KEYS: &[&str] = &["content"];

/// `{success: true, ...fields}`.
pub(crate) fn success(fields: Map<String, Value>) -> Value {
    let mut out = Map::with_capacity(fields.len().saturating_add(1));
    out.insert("success".into(), Value::Bool(true));
    out.extend(fields);
    Value::Object(out)
}

/// `{success: false, error, tool, params}` with sensitive params redacted.
pub(crate) fn failure(tool: &str, error: &ToolError, params: &Value) -> Value {
    json!({
        "success": false,
        "error": error.to_string(),
        "tool": tool,
        "params": redact_params(params),
    })
}

/// Copy of `params` with file content replaced by a length marker.
#[must_use]
pub fn redact_params(params: &Value) -> Value {
    let Value::Object(map) = params else {
        return params.clone();
    };
    let redacted = map
        .iter()
        .map(|(key, value)| {
            let value = if REDACTED_KEYS.contains(&key.as_str()) && !value.is_null() {
                Value::String(format!("[redacted: {} chars]", content_len(value)))
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect();
    Value::Object(redacted)
}

fn content_len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        other => other.to_string().chars().count(),
    }
}

/// Serialize an operation result into envelope fields.
pub(crate) fn fields(value: &impl Serialize) -> ToolResult {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => {
            let mut map = Map::new();
            map.insert("value".into(), other);
            Ok(map)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_sets_flag() {
        let mut fields = Map::new();
        fields.insert("size".into(), json!(5));
        let env = success(fields);
        assert_eq!(env, json!({"success": true, "size": 5}));
    }

    #[test]
    fn test_failure_redacts_content() {
        let params = json!({"path": "a.txt", "content": "secret"});
        let env = failure("writeFile", &ToolError::UnknownTool("x".into()), &params);
        assert_eq!(env["success"], json!(false));
        assert_eq!(env["tool"], json!("writeFile"));
        assert_eq!(env["params"]["path"], json!("a.txt"));
        assert_eq!(env["params"]["content"], json!("[redacted: 6 chars]"));
        assert!(env["error"].as_str().unwrap().contains("Unknown tool"));
    }

    #[test]
    fn test_redact_non_object() {
        assert_eq!(redact_params(&json!("raw")), json!("raw"));
        assert_eq!(
            redact_params(&json!({"content": null})),
            json!({"content": null})
        );
    }
}
