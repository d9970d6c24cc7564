//! Pipeline document loading

use serde_json::Value as JsonValue;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::CommandError;

/// Read a YAML pipeline definition into a JSON value
///
/// Merge keys are resolved. A document containing only `null` is treated as
/// an empty mapping.
pub fn load_document(path: &Path) -> Result<JsonValue, CommandError> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            CommandError::Input(format!("File not found: {}", path.display()))
        }
        _ => CommandError::Input(format!("Failed to read {}: {}", path.display(), e)),
    })?;

    let invalid = |e: serde_yaml::Error| CommandError::Input(format!("Invalid YAML: {}", e));

    let mut yaml: serde_yaml::Value = serde_yaml::from_str(&contents).map_err(invalid)?;
    // resolve `<<: *anchor` before the document leaves YAML
    yaml.apply_merge().map_err(invalid)?;
    let document: JsonValue = serde_json::to_value(yaml)
        .map_err(|e| CommandError::Input(format!("Invalid YAML: {}", e)))?;

    Ok(match document {
        JsonValue::Null => JsonValue::Object(Default::default()),
        other => other,
    })
}
