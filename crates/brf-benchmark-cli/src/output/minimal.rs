use serde_json::Value;

/// Print just the key answer from the output.
///
/// Looks for well-known result fields (dotted paths) in priority order;
/// row results print one line per row.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_paths = [
        "total_savings_per_year",
        "standing.percentile",
        "distribution.median",
        "total_unclassified_labels",
    ];

    match result_obj {
        Value::Object(map) => {
            if let Some(Value::Array(entries)) = map.get("entries") {
                print_rows(entries);
                return;
            }
            for path in &priority_paths {
                if let Some(val) = lookup(result_obj, path) {
                    if !val.is_null() {
                        println!("{}", format_minimal(val));
                        return;
                    }
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
                return;
            }
        }
        Value::Array(rows) => {
            print_rows(rows);
            return;
        }
        _ => {}
    }

    println!("{}", format_minimal(result_obj));
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, key| v.get(key))
}

/// `label<TAB>category` for normalized labels, `rank<TAB>name<TAB>value`
/// for leaderboard entries.
fn print_rows(rows: &[Value]) {
    for row in rows {
        let line = if let Some(rank) = row.get("rank") {
            format!(
                "{}\t{}\t{}",
                format_minimal(rank),
                row.get("name").map(format_minimal).unwrap_or_default(),
                row.get("value").map(format_minimal).unwrap_or_default()
            )
        } else if let Some(label) = row.get("label") {
            format!(
                "{}\t{}",
                format_minimal(label),
                row.get("category").map(format_minimal).unwrap_or_default()
            )
        } else {
            format_minimal(row)
        };
        println!("{}", line);
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_dotted_path() {
        let v = json!({"standing": {"percentile": "80"}});
        assert_eq!(lookup(&v, "standing.percentile"), Some(&json!("80")));
        assert_eq!(lookup(&v, "distribution.median"), None);
    }
}
