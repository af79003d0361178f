//! Output formatting and control utilities.
//!
//! CHANGELOG:
//! - 10/18/2026 - Char-boundary safe truncation, error codes in JSON errors
//! - 10/18/2026 - Initial implementation

use serde::Serialize;
use serde_json::{json, Value};

/// Output control settings from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct OutputControls {
    pub json: bool,
    pub compact: bool,
    pub fields: Option<String>,
    pub max_text_chars: Option<u32>,
}

impl OutputControls {
    /// Emit data according to output controls.
    pub fn emit<T: Serialize>(&self, data: &T) -> String {
        let value = serde_json::to_value(data).unwrap_or(json!(null));

        let filtered = match self.fields {
            Some(ref fields) => filter_fields(&value, fields),
            None => value,
        };

        let truncated = match self.max_text_chars {
            Some(max_chars) => truncate_text_fields(&filtered, max_chars as usize),
            None => filtered,
        };

        if self.compact {
            serde_json::to_string(&truncated).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string_pretty(&truncated).unwrap_or_else(|_| "{}".to_string())
        }
    }

    /// Print data to stdout according to output controls.
    pub fn print<T: Serialize>(&self, data: &T) {
        println!("{}", self.emit(data));
    }
}

/// Keep only the listed top-level fields of each object.
fn filter_fields(value: &Value, fields: &str) -> Value {
    let field_list: Vec<&str> = fields.split(',').map(|s| s.trim()).collect();

    match value {
        Value::Array(arr) => Value::Array(arr.iter().map(|v| filter_fields(v, fields)).collect()),
        Value::Object(map) => {
            let mut filtered = serde_json::Map::new();
            for field in &field_list {
                if let Some(v) = map.get(*field) {
                    filtered.insert(field.to_string(), v.clone());
                }
            }
            Value::Object(filtered)
        }
        _ => value.clone(),
    }
}

/// Truncate string fields to `max_chars` characters.
fn truncate_text_fields(value: &Value, max_chars: usize) -> Value {
    match value {
        Value::String(s) if s.chars().count() > max_chars => {
            let head: String = s.chars().take(max_chars).collect();
            Value::String(format!("{}...", head))
        }
        Value::Array(arr) => {
            Value::Array(arr.iter().map(|v| truncate_text_fields(v, max_chars)).collect())
        }
        Value::Object(map) => {
            let mut truncated = serde_json::Map::new();
            for (k, v) in map {
                truncated.insert(k.clone(), truncate_text_fields(v, max_chars));
            }
            Value::Object(truncated)
        }
        _ => value.clone(),
    }
}

/// Format error as JSON.
pub fn format_error(error: &str, code: Option<&str>) -> String {
    let mut body = json!({
        "error": error,
        "success": false
    });
    if let Some(code) = code {
        body["code"] = json!(code);
    }
    serde_json::to_string(&body).unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_filter_objects_in_arrays() {
        let controls = OutputControls {
            compact: true,
            fields: Some("text, index".to_string()),
            ..Default::default()
        };
        let data = json!([{"text": "Alice", "index": 0, "class_name": "x"}]);
        assert_eq!(controls.emit(&data), r#"[{"index":0,"text":"Alice"}]"#);
    }

    #[test]
    fn test_truncation_counts_chars() {
        let controls = OutputControls {
            compact: true,
            max_text_chars: Some(2),
            ..Default::default()
        };
        assert_eq!(controls.emit(&json!({"m": "你好世界"})), r#"{"m":"你好..."}"#);
        assert_eq!(controls.emit(&json!({"m": "ok"})), r#"{"m":"ok"}"#);
    }

    #[test]
    fn test_pretty_by_default() {
        let controls = OutputControls::default();
        assert!(controls.emit(&json!({"a": 1})).contains('\n'));
    }

    #[test]
    fn test_format_error() {
        let value: Value = serde_json::from_str(&format_error("gone", Some("DEVICE_UNAVAILABLE"))).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["code"], "DEVICE_UNAVAILABLE");

        let value: Value = serde_json::from_str(&format_error("bad", None)).unwrap();
        assert!(value.get("code").is_none());
    }
}
