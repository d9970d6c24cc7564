//! Schema validation results

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// One schema violation reported by the validation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted location of the offending node (empty for document-level issues)
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Build an issue from one entry of an error list
    ///
    /// Accepts `{"path", "message"}` objects, `{"loc": [...], "msg"}` objects
    /// and bare strings. Anything else is kept verbatim as the message.
    fn from_value(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(message) => Self::new("", message.as_str()),
            JsonValue::Object(map) => {
                let path = match map.get("path").or_else(|| map.get("loc")) {
                    Some(JsonValue::String(path)) => path.clone(),
                    Some(JsonValue::Array(segments)) => segments
                        .iter()
                        .map(|segment| match segment {
                            JsonValue::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join("."),
                    _ => String::new(),
                };
                let message = match map.get("message").or_else(|| map.get("msg")) {
                    Some(JsonValue::String(message)) => message.clone(),
                    Some(other) => other.to_string(),
                    None => value.to_string(),
                };
                Self { path, message }
            }
            other => Self::new("", other.to_string()),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Outcome of validating a pipeline document against the hosted schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Extract the error list from a rejected validation response body
    ///
    /// Recognises a top-level array, or an object carrying an `errors` or
    /// `detail` list. A string `detail` becomes a single issue. Returns `None`
    /// when the body carries no errors at all.
    pub fn issues_from_body(body: &JsonValue) -> Option<Vec<ValidationIssue>> {
        if let JsonValue::Object(map) = body {
            if let Some(JsonValue::String(message)) = map.get("errors").or_else(|| map.get("detail"))
            {
                return Some(vec![ValidationIssue::new("", message.as_str())]);
            }
        }

        Self::issue_list_from_body(body)
    }

    /// Like [`issues_from_body`](Self::issues_from_body), but only list-valued
    /// errors count
    ///
    /// Used for success responses, where a string `detail` is informational.
    pub fn issue_list_from_body(body: &JsonValue) -> Option<Vec<ValidationIssue>> {
        let items = match body {
            JsonValue::Array(items) => items,
            JsonValue::Object(map) => match map.get("errors").or_else(|| map.get("detail")) {
                Some(JsonValue::Array(items)) => items,
                _ => return None,
            },
            _ => return None,
        };

        Some(items.iter().map(ValidationIssue::from_value).collect())
    }
}
