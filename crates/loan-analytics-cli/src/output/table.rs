use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::cell;

/// Scalar fields as a Field/Value table, followed by any row series
/// (amortisation rows, yearly summaries, observations) as their own tables.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_envelope(result, map),
            None => print_fields(map),
        },
        Value::Array(rows) => print_rows(rows),
        _ => println!("{value}"),
    }
}

fn print_envelope(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(fields) => {
            print_fields(fields);
            for (key, val) in fields {
                if let Value::Array(rows) = val {
                    if matches!(rows.first(), Some(Value::Object(_))) {
                        println!("\n{key}:");
                        print_rows(rows);
                    }
                }
            }
        }
        other => println!("{}", cell(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match val {
            Value::Array(items) if matches!(items.first(), Some(Value::Object(_))) => {
                builder.push_record([key.clone(), format!("({} rows)", items.len())]);
            }
            Value::Array(items) => {
                let joined: Vec<String> = items.iter().map(cell).collect();
                builder.push_record([key.clone(), joined.join(", ")]);
            }
            _ => builder.push_record([key.clone(), cell(val)]),
        }
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            println!("{}", cell(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(cell).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

