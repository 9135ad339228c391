//! Lenient deserializers for gateway parameters.
//!
//! Gateways hand query-string values over as strings (`"limit": "5"`) while
//! direct callers send proper JSON types, so numeric and list fields accept both.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

pub fn optional_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected an integer, got {}", n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected an integer, got {:?}", s))),
        Some(other) => Err(de::Error::custom(format!(
            "expected an integer, got {}",
            other
        ))),
    }
}

pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(de::Error::custom("expected a finite number")),
    }
}

/// Accepts `["a", "b"]`, `"a"` or `"a,b"`; blank entries are dropped
pub fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect::<Vec<_>>(),
        Some(Value::Array(values)) => {
            let mut items = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::String(s) => items.push(s),
                    other => {
                        return Err(de::Error::custom(format!(
                            "expected a list of strings, found {}",
                            other
                        )))
                    }
                }
            }
            items
        }
        Some(other) => {
            return Err(de::Error::custom(format!(
                "expected a string or a list of strings, got {}",
                other
            )))
        }
    };

    Ok(Some(
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
    ))
}
