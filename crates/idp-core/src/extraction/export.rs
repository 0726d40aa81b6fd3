//! Result exports.

use crate::error::Result;
use crate::models::document::ExtractionResult;

/// Serialize a result as compact JSON.
pub fn to_json(result: &ExtractionResult) -> Result<String> {
    Ok(serde_json::to_string(result)?)
}

/// Serialize a result as indented JSON.
pub fn to_json_pretty(result: &ExtractionResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Parse a result previously written by [`to_json`] or [`to_json_pretty`].
pub fn from_json(json: &str) -> Result<ExtractionResult> {
    Ok(serde_json::from_str(json)?)
}

/// One `name: value` line per field, in result order.
pub fn to_text(result: &ExtractionResult) -> String {
    let mut output = String::new();
    for field in &result.fields {
        output.push_str(&field.name);
        output.push_str(": ");
        output.push_str(&field.normalized);
        output.push('\n');
    }
    output
}
