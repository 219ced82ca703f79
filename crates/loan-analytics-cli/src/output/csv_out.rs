use serde_json::Value;
use std::io;

use super::{cell, primary_series, result_of};

/// Write CSV to stdout. Results carrying a row series (schedules,
/// observations) are written one row per line; everything else as
/// `field,value` pairs.
pub fn print_csv(value: &Value) {
    let result = result_of(value);
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match (result, primary_series(result)) {
        (_, Some((_, rows))) => write_rows(&mut wtr, rows),
        (Value::Object(map), None) => write_fields(&mut wtr, map),
        (Value::Array(items), None) => write_rows(&mut wtr, items),
        (other, None) => wtr.write_record([cell(other)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {e}");
    }
}

fn write_fields<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    map: &serde_json::Map<String, Value>,
) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), cell(val).as_str()])?;
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([cell(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows.iter().filter_map(Value::as_object) {
        wtr.write_record(
            headers
                .iter()
                .map(|h| row.get(*h).map(cell).unwrap_or_default()),
        )?;
    }
    Ok(())
}
