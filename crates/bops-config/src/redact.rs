//! Secret masking for displayed configuration

use serde_json::Value;

/// Replacement text for masked values
pub const REDACTED: &str = "[REDACTED]";

/// Key fragments that mark a value as secret
const SECRET_KEYS: &[&str] = &[
    "password",
    "token",
    "secret",
    "private_key",
    "api_key",
    "credential",
];

/// Mask secret scalars in place, returning the dotted paths that were masked.
pub fn redact_secrets(value: &mut Value) -> Vec<String> {
    let mut redactions = Vec::new();
    redact_recursive(value, String::new(), &mut redactions);
    redactions
}

fn is_secret_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    SECRET_KEYS.iter().any(|s| key_lower.contains(s))
}

fn redact_recursive(value: &mut Value, path: String, redactions: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                let current_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };

                if is_secret_key(key) && !val.is_object() && !val.is_array() && !val.is_null() {
                    *val = Value::String(REDACTED.to_string());
                    redactions.push(current_path);
                } else {
                    redact_recursive(val, current_path, redactions);
                }
            }
        }
        Value::Array(arr) => {
            for (i, val) in arr.iter_mut().enumerate() {
                redact_recursive(val, format!("{}[{}]", path, i), redactions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_secrets() {
        let mut value = json!({
            "api_key": "abc",
            "DB_PASSWORD": "hunter2",
            "name": "visible"
        });
        let redacted = redact_secrets(&mut value);

        assert_eq!(value["api_key"], REDACTED);
        assert_eq!(value["DB_PASSWORD"], REDACTED);
        assert_eq!(value["name"], "visible");
        assert_eq!(redacted.len(), 2);
    }

    #[test]
    fn test_nested_and_array_secrets() {
        let mut value = json!({
            "database": {
                "connections": [
                    {"host": "db1", "password": "one"},
                    {"host": "db2", "password": null}
                ]
            }
        });
        let redacted = redact_secrets(&mut value);

        assert_eq!(value["database"]["connections"][0]["password"], REDACTED);
        assert!(value["database"]["connections"][1]["password"].is_null());
        assert_eq!(value["database"]["connections"][0]["host"], "db1");
        assert_eq!(redacted, vec!["database.connections[0].password".to_string()]);
    }

    #[test]
    fn test_secret_named_table_is_descended() {
        let mut value = json!({"secrets": {"token": "t", "note": "n"}});
        redact_secrets(&mut value);

        assert_eq!(value["secrets"]["token"], REDACTED);
        assert_eq!(value["secrets"]["note"], "n");
    }
}
