use crate::pipeline::{Args, Value};

pub const INPUT_TOKEN: &str = "$input";
pub const FILE_TOKEN: &str = "$file";

/// Replaces argument values that are exactly `$input` or `$file`. Only
/// top-level values and the direct elements of list/mapping values are
/// inspected. `$file` stays as written when there is no file name.
pub fn substitute_args(args: &Args, input: &Value, file_name: Option<&str>) -> Args {
    args.iter()
        .map(|(key, value)| {
            let replaced = match value {
                serde_json::Value::Array(items) => serde_json::Value::Array(
                    items
                        .iter()
                        .map(|item| substitute_token(item, input, file_name))
                        .collect(),
                ),
                serde_json::Value::Object(map) => serde_json::Value::Object(
                    map.iter()
                        .map(|(k, item)| (k.clone(), substitute_token(item, input, file_name)))
                        .collect(),
                ),
                other => substitute_token(other, input, file_name),
            };
            (key.clone(), replaced)
        })
        .collect()
}

fn substitute_token(
    value: &serde_json::Value,
    input: &Value,
    file_name: Option<&str>,
) -> serde_json::Value {
    match value.as_str() {
        Some(INPUT_TOKEN) => input.to_json(),
        Some(FILE_TOKEN) => match file_name {
            Some(name) => serde_json::Value::String(name.to_string()),
            None => value.clone(),
        },
        _ => value.clone(),
    }
}
