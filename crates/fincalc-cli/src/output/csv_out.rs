use serde_json::Value;
use std::io;

use super::flatten_result;

type StdoutCsv<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Row arrays (loan schedules) become one CSV table. A result envelope
/// becomes field/value rows; any schedule inside it follows after a blank
/// line so spreadsheet imports keep the summary separate.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(stdout.lock());

    match value {
        Value::Array(rows) => write_rows(&mut wtr, rows),
        Value::Object(map) => {
            let result = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let (scalars, tables) = flatten_result(result);
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in &scalars {
                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
            for (name, rows) in &tables {
                let _ = wtr.write_record([""]);
                let _ = wtr.write_record([name.as_str()]);
                write_rows(&mut wtr, rows);
            }
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut StdoutCsv<'_>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(format_csv_value).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&record);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
