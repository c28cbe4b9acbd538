//! Fragment merge logic
//!
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (last wins)
//! - Scalars: override (last wins)

use serde_json::{Map, Value};

/// Sentinel fragment name that merges into the top level instead of being
/// mounted under its own key.
pub const ROOT_FRAGMENT: &str = "config";

/// Deep merge two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive)
/// - Arrays: REPLACE (second wins entirely)
/// - Scalars: override (second wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        (_, overlay) => overlay,
    }
}

/// Merge one fragment into the accumulator.
///
/// The `config` fragment merges at the top level; every other fragment is
/// mounted under a key equal to its name, replacing whatever was there.
pub fn mount_fragment(acc: &mut Map<String, Value>, name: &str, fragment: Map<String, Value>) {
    if name == ROOT_FRAGMENT {
        let base = Value::Object(std::mem::take(acc));
        if let Value::Object(merged) = deep_merge(base, Value::Object(fragment)) {
            *acc = merged;
        }
    } else {
        acc.insert(name.to_string(), Value::Object(fragment));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"timeout": 100}), json!({"timeout": 200}));
        assert_eq!(result["timeout"], 200);
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({"cache": {"driver": "file", "ttl": 60}});
        let overlay = json!({"cache": {"driver": "redis"}});
        let result = deep_merge(base, overlay);

        assert_eq!(result["cache"]["driver"], "redis");
        assert_eq!(result["cache"]["ttl"], 60);
    }

    #[test]
    fn test_array_replace() {
        let base = json!({"hosts": ["a", "b", "c"]});
        let overlay = json!({"hosts": ["x"]});
        let result = deep_merge(base, overlay);

        assert_eq!(result["hosts"], json!(["x"]));
    }

    #[test]
    fn test_null_override() {
        let result = deep_merge(json!({"value": 100}), json!({"value": null}));
        assert!(result["value"].is_null());
    }

    #[test]
    fn test_mount_root_fragment_merges_top_level() {
        let mut acc = object(json!({"a": 1, "nested": {"x": 1}}));
        mount_fragment(&mut acc, "config", object(json!({"b": 2, "nested": {"y": 2}})));

        assert_eq!(
            Value::Object(acc),
            json!({"a": 1, "b": 2, "nested": {"x": 1, "y": 2}})
        );
    }

    #[test]
    fn test_mount_named_fragment_nests() {
        let mut acc = object(json!({"a": 1}));
        mount_fragment(&mut acc, "db", object(json!({"host": "localhost"})));

        assert_eq!(Value::Object(acc), json!({"a": 1, "db": {"host": "localhost"}}));
    }

    #[test]
    fn test_mount_named_fragment_replaces_existing_key() {
        let mut acc = object(json!({"db": {"host": "old", "port": 1}}));
        mount_fragment(&mut acc, "db", object(json!({"host": "new"})));

        assert_eq!(acc["db"], json!({"host": "new"}));
    }

    #[test]
    fn test_merge_is_deterministic() {
        let fold = || {
            let mut acc = Map::new();
            mount_fragment(&mut acc, "config", object(json!({"a": 1})));
            mount_fragment(&mut acc, "db", object(json!({"host": "localhost"})));
            mount_fragment(&mut acc, "config", object(json!({"a": 2})));
            Value::Object(acc)
        };
        assert_eq!(fold(), fold());
        assert_eq!(fold(), json!({"a": 2, "db": {"host": "localhost"}}));
    }
}
