use serde_json::Value;

use super::flatten_result;

/// Headline field of each calculator, in lookup order.
const HEADLINE_KEYS: [&str; 8] = [
    "payment",
    "total_tax",
    "difference",
    "is_worthwhile",
    "monthly_surplus",
    "monthly",
    "duration.periods",
    "duration.kind",
];

/// Print just the key answer value from the output.
///
/// Row arrays print their row count; result objects print the first
/// headline field present, or the first scalar when none matches.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            let (scalars, _) = flatten_result(map);
            let headline = HEADLINE_KEYS.iter().find_map(|key| {
                scalars
                    .iter()
                    .find(|(name, val)| name.as_str() == *key && !val.is_null())
            });
            match headline.or_else(|| scalars.first()) {
                Some((_, val)) if headline.is_some() => println!("{}", format_minimal(val)),
                Some((name, val)) => println!("{}: {}", name, format_minimal(val)),
                None => println!("(empty)"),
            }
        }
        Value::Array(rows) => println!("{} rows", rows.len()),
        other => println!("{}", format_minimal(other)),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
