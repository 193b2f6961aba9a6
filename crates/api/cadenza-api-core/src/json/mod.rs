use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value as JsonValue};

use crate::Value;

/// Policy describing how purely numeric arrays should be normalized when
/// converting shorthand JSON into the canonical `{ "type": ..., "data": ... }`
/// representation used by `cadenza_api_core::Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericArrayPolicy {
    /// Arrays of length 2/3/4 become Vec2/Vec3/Vec4 and any other numeric
    /// array becomes `Vector`. This is what clip keyframes use.
    AutoVectorKinds,
    /// Treat all numeric arrays as `Vector` regardless of length.
    AlwaysVector,
}

/// Normalize shorthand `Value` JSON into the canonical `{ "type": ..., "data": ... }`
/// representation understood by the serde derives on [`Value`]. Accepts shorthand
/// objects such as `{ "color": [1, 0, 0, 1] }` and primitive aliases like `1.0`
/// or `[0, 480]`. Plain objects become records.
pub fn normalize_value_json(value: JsonValue) -> JsonValue {
    normalize_value_json_with_policy(value, NumericArrayPolicy::AutoVectorKinds)
}

pub fn normalize_value_json_with_policy(value: JsonValue, policy: NumericArrayPolicy) -> JsonValue {
    match value {
        JsonValue::Number(n) => json!({ "type": "float", "data": n }),
        JsonValue::Bool(b) => json!({ "type": "bool", "data": b }),
        JsonValue::String(s) => json!({ "type": "text", "data": s }),
        JsonValue::Array(arr) => {
            if !arr.iter().all(|x| x.is_number()) {
                // Mixed arrays have no canonical kind; let deserialization report it.
                return JsonValue::Array(arr);
            }
            match policy {
                NumericArrayPolicy::AutoVectorKinds => match arr.len() {
                    2 => json!({ "type": "vec2", "data": arr }),
                    3 => json!({ "type": "vec3", "data": arr }),
                    4 => json!({ "type": "vec4", "data": arr }),
                    _ => json!({ "type": "vector", "data": arr }),
                },
                NumericArrayPolicy::AlwaysVector => json!({ "type": "vector", "data": arr }),
            }
        }
        JsonValue::Object(obj) => {
            if obj.contains_key("type") && obj.contains_key("data") {
                return JsonValue::Object(obj);
            }
            if obj.len() == 1 {
                let (key, inner) = match obj.iter().next() {
                    Some((k, v)) => (k.as_str(), v),
                    None => return JsonValue::Object(obj),
                };
                let tag = match key {
                    "float" if inner.is_number() => Some("float"),
                    "bool" if inner.is_boolean() => Some("bool"),
                    "text" if inner.is_string() => Some("text"),
                    "vec2" | "vec3" | "vec4" | "vector" if inner.is_array() => Some(key),
                    "color" if inner.is_array() => Some("colorrgba"),
                    _ => None,
                };
                if let Some(tag) = tag {
                    return json!({ "type": tag, "data": inner });
                }
                if let ("record", Some(fields)) = (key, inner.as_object()) {
                    return normalize_record(fields, policy);
                }
            }
            normalize_record(&obj, policy)
        }
        other => other,
    }
}

fn normalize_record(fields: &Map<String, JsonValue>, policy: NumericArrayPolicy) -> JsonValue {
    let mut data = Map::new();
    for (key, val) in fields.iter() {
        data.insert(
            key.clone(),
            normalize_value_json_with_policy(val.clone(), policy),
        );
    }
    json!({ "type": "record", "data": JsonValue::Object(data) })
}

/// Convenience helper that normalizes Value JSON then deserializes it into the
/// strongly typed [`Value`] enum.
pub fn parse_value(value: JsonValue) -> Result<Value, serde_json::Error> {
    serde_json::from_value(normalize_value_json(value))
}

/// Serde `deserialize_with` adapter accepting shorthand value JSON.
pub fn deserialize_shorthand<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let raw = JsonValue::deserialize(deserializer)?;
    parse_value(raw).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_and_arrays() {
        assert_eq!(parse_value(json!(1.5)).unwrap(), Value::Float(1.5));
        assert_eq!(parse_value(json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(parse_value(json!([0, 480])).unwrap(), Value::vec2(0.0, 480.0));
        assert_eq!(
            parse_value(json!([1, 2, 3, 4, 5])).unwrap(),
            Value::Vector(vec![1.0, 2.0, 3.0, 4.0, 5.0])
        );
        let v = normalize_value_json_with_policy(json!([0, 480]), NumericArrayPolicy::AlwaysVector);
        assert_eq!(v, json!({ "type": "vector", "data": [0, 480] }));
    }

    #[test]
    fn tagged_objects() {
        assert_eq!(
            parse_value(json!({ "color": [255, 255, 255, 0] })).unwrap(),
            Value::color(255.0, 255.0, 255.0, 0.0)
        );
        assert_eq!(
            parse_value(json!({ "type": "vec3", "data": [1, 2, 3] })).unwrap(),
            Value::vec3(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn plain_objects_become_records() {
        let v = parse_value(json!({ "bar": { "color": [0.5, 0.5, 0.5, 0.5] }, "n": 1 })).unwrap();
        assert_eq!(
            v,
            Value::record([
                ("bar", Value::color(0.5, 0.5, 0.5, 0.5)),
                ("n", Value::f(1.0)),
            ])
        );
    }
}
