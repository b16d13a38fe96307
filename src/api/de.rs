//! Lenient field deserializers.
//!
//! The same DTO is fed from JSON bodies, urlencoded forms and multipart forms,
//! so numbers and booleans may arrive as strings (`"3"`, `"on"`), and lists may
//! arrive as a single value, a repeated key, or a JSON-encoded string.
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// `true`/`"true"`/`"on"`/`"1"`/`"yes"` and their negatives. Empty string reads as absent.
pub fn flexible_bool<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(v) = Option::<Scalar>::deserialize(d)? else {
        return Ok(None);
    };
    match v {
        Scalar::Bool(b) => Ok(Some(b)),
        Scalar::Int(n) => Ok(Some(n != 0)),
        Scalar::Float(f) => Ok(Some(f != 0.0)),
        Scalar::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "on" | "1" | "yes" => Ok(Some(true)),
            "false" | "off" | "0" | "no" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("invalid boolean: {other}"))),
        },
    }
}

/// Integer or numeric string. Empty string reads as absent.
pub fn flexible_i32<'de, D>(d: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(v) = Option::<Scalar>::deserialize(d)? else {
        return Ok(None);
    };
    let n = match v {
        Scalar::Int(n) => n,
        Scalar::Float(f) if f.fract() == 0.0 => f as i64,
        Scalar::Str(s) if s.trim().is_empty() => return Ok(None),
        Scalar::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("invalid number: {s}")))?,
        _ => return Err(D::Error::custom("expected an integer")),
    };
    i32::try_from(n)
        .map(Some)
        .map_err(|_| D::Error::custom("number out of range"))
}

/// Array, single string, or a JSON-encoded array inside a string.
pub fn string_list<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    match v {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|i| match i {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.trim().is_empty())
            .collect()),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(Vec::new());
            }
            if s.starts_with('[') {
                return serde_json::from_str::<Vec<String>>(s).map_err(D::Error::custom);
            }
            Ok(vec![s.to_string()])
        }
        Some(other) => Err(D::Error::custom(format!("expected a list, got {other}"))),
    }
}

/// Structured value that forms can only send as a JSON string.
pub fn json_or_string<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => serde_json::from_str(&s).map(Some).map_err(D::Error::custom),
        Some(v) => serde_json::from_value(v).map(Some).map_err(D::Error::custom),
    }
}

/// Trimmed string; blank reads as absent.
pub fn trimmed<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Scalar>::deserialize(d)?;
    Ok(v.and_then(|s| {
        let s = match s {
            Scalar::Str(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        };
        let t = s.trim();
        (!t.is_empty()).then(|| t.to_string())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "flexible_bool")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "flexible_i32")]
        n: Option<i32>,
        #[serde(default, deserialize_with = "string_list")]
        list: Vec<String>,
        #[serde(default, deserialize_with = "trimmed")]
        s: Option<String>,
        #[serde(default, deserialize_with = "json_or_string")]
        nested: Option<Vec<u8>>,
    }

    fn sample(v: Value) -> Sample {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn checkbox_and_bool_forms() {
        assert_eq!(sample(json!({"flag": "on"})).flag, Some(true));
        assert_eq!(sample(json!({"flag": true})).flag, Some(true));
        assert_eq!(sample(json!({"flag": "false"})).flag, Some(false));
        assert_eq!(sample(json!({"flag": ""})).flag, None);
        assert_eq!(sample(json!({})).flag, None);
        assert!(serde_json::from_value::<Sample>(json!({"flag": "maybe"})).is_err());
    }

    #[test]
    fn numeric_strings() {
        assert_eq!(sample(json!({"n": "7"})).n, Some(7));
        assert_eq!(sample(json!({"n": 7})).n, Some(7));
        assert_eq!(sample(json!({"n": " "})).n, None);
        assert!(serde_json::from_value::<Sample>(json!({"n": "x"})).is_err());
    }

    #[test]
    fn lists_in_every_shape() {
        assert_eq!(sample(json!({"list": ["a", "b"]})).list, vec!["a", "b"]);
        assert_eq!(sample(json!({"list": "a"})).list, vec!["a"]);
        assert_eq!(sample(json!({"list": "[\"a\",\"b\"]"})).list, vec!["a", "b"]);
        assert!(sample(json!({"list": ""})).list.is_empty());
    }

    #[test]
    fn trimmed_strings_and_json_strings() {
        assert_eq!(sample(json!({"s": "  hi "})).s.as_deref(), Some("hi"));
        assert_eq!(sample(json!({"s": "   "})).s, None);
        assert_eq!(sample(json!({"nested": "[1,2]"})).nested, Some(vec![1, 2]));
        assert_eq!(sample(json!({"nested": [3]})).nested, Some(vec![3]));
    }
}
