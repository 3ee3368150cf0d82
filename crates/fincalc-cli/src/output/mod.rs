pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Split a result object into dotted scalar rows and row-shaped arrays
/// (schedules, category totals) that deserve their own table.
pub(crate) fn flatten_result(map: &Map<String, Value>) -> (Vec<(String, Value)>, Vec<(String, Vec<Value>)>) {
    let mut scalars = Vec::new();
    let mut tables = Vec::new();
    flatten_into("", map, &mut scalars, &mut tables);
    (scalars, tables)
}

fn flatten_into(
    prefix: &str,
    map: &Map<String, Value>,
    scalars: &mut Vec<(String, Value)>,
    tables: &mut Vec<(String, Vec<Value>)>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, scalars, tables),
            Value::Array(rows) if rows.first().is_some_and(Value::is_object) => {
                tables.push((name, rows.clone()));
            }
            _ => scalars.push((name, val.clone())),
        }
    }
}
