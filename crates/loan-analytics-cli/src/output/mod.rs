pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value for a single cell.
pub(crate) fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The `result` object of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// First array-of-objects field in a result, e.g. schedule rows or
/// per-date observations.
pub(crate) fn primary_series(result: &Value) -> Option<(&str, &Vec<Value>)> {
    result.as_object()?.iter().find_map(|(key, val)| match val {
        Value::Array(items) if matches!(items.first(), Some(Value::Object(_))) => {
            Some((key.as_str(), items))
        }
        _ => None,
    })
}
