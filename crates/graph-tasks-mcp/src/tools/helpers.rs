//! Shared helper functions for MCP tool implementations.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use graph_tasks_client::ClientError;

/// Build a structured error JSON string that LLMs can parse.
pub fn error_json(error_code: &str, message: &str) -> String {
    serde_json::json!({
        "error": error_code,
        "message": message,
    })
    .to_string()
}

/// Error result: `is_error` set, single text payload from [`error_json`].
pub fn error_result(error_code: &str, message: &str) -> CallToolResult {
    CallToolResult::error(vec![Content::text(error_json(error_code, message))])
}

/// Error result for a failed Graph call, keyed by the error's stable code.
pub fn client_error_result(error: &ClientError) -> CallToolResult {
    error_result(error.error_code(), &error.to_string())
}

/// Success result carrying `value` as pretty-printed JSON.
pub fn json_result<T: Serialize>(value: &T) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CallToolResult::success(vec![Content::text(json)]),
        Err(e) => error_result("serialization_error", &e.to_string()),
    }
}

/// First text payload of a tool result.
pub fn result_text(result: &CallToolResult) -> Option<&str> {
    result
        .content
        .first()
        .and_then(|c| c.raw.as_text())
        .map(|t| t.text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_json_shape() {
        let parsed: serde_json::Value =
            serde_json::from_str(&error_json("not_found", "Planner task not found: x")).unwrap();
        assert_eq!(parsed["error"], "not_found");
        assert_eq!(parsed["message"], "Planner task not found: x");
    }

    #[test]
    fn test_client_error_result_sets_flag() {
        let result = client_error_result(&ClientError::config_error("No default To-Do list found"));
        assert_eq!(result.is_error, Some(true));
        let parsed: serde_json::Value = serde_json::from_str(result_text(&result).unwrap()).unwrap();
        assert_eq!(parsed["error"], "configuration_error");
    }

    #[test]
    fn test_json_result_is_pretty() {
        let result = json_result(&serde_json::json!({ "a": 1 }));
        assert_ne!(result.is_error, Some(true));
        assert_eq!(result_text(&result), Some("{\n  \"a\": 1\n}"));
    }
}
