// src/client/response.rs

use serde_json::Value;

/// Unwrap the collection an upstream response carries. The API nests
/// payloads inconsistently, so the probe order is fixed and documented:
///
/// 1. the payload itself, when it is an array;
/// 2. `payload.data`, when that is an array;
/// 3. `payload.data.data`, when that is an array;
/// 4. otherwise an empty collection (never a type error).
pub fn collection(value: &Value) -> Vec<Value> {
    if let Value::Array(items) = value {
        return items.clone();
    }
    if let Some(Value::Array(items)) = value.get("data") {
        return items.clone();
    }
    if let Some(Value::Array(items)) = value.get("data").and_then(|data| data.get("data")) {
        return items.clone();
    }
    Vec::new()
}

/// Unwrap a single record: `payload.data` when it is an object, the
/// payload itself otherwise.
pub fn record(value: &Value) -> &Value {
    match value.get("data") {
        Some(data) if data.is_object() => data,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_each_nesting_level_in_order() {
        let flat = json!([1, 2]);
        let nested = json!({"data": [3]});
        let doubly = json!({"data": {"data": [4, 5]}});

        assert_eq!(collection(&flat), vec![json!(1), json!(2)]);
        assert_eq!(collection(&nested), vec![json!(3)]);
        assert_eq!(collection(&doubly), vec![json!(4), json!(5)]);
    }

    #[test]
    fn outer_array_wins_over_nested_data() {
        let both = json!({"data": [1]});
        assert_eq!(collection(&both), vec![json!(1)]);
    }

    #[test]
    fn total_mismatch_yields_empty_collection() {
        assert!(collection(&json!({"data": "oops"})).is_empty());
        assert!(collection(&json!("plain string")).is_empty());
        assert!(collection(&json!(null)).is_empty());
        assert!(collection(&json!({"data": {"data": 7}})).is_empty());
    }

    #[test]
    fn record_unwraps_data_object_only() {
        let wrapped = json!({"data": {"id": 1}});
        assert_eq!(record(&wrapped), &json!({"id": 1}));

        let bare = json!({"id": 2});
        assert_eq!(record(&bare), &bare);

        let data_is_array = json!({"data": [1]});
        assert_eq!(record(&data_is_array), &data_is_array);
    }
}
