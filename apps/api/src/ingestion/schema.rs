//! Lenient field decoders for model output.
//!
//! Models drift: scores arrive as `"85"`, `85.4` or `null`, lists as a single string,
//! tags in lowercase. Each decoder maps anything it cannot use to the field default
//! instead of failing the whole response. Combine with `#[serde(default)]` so absent
//! keys take the same default.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// 0–100 integer score. Rounds floats, clamps out-of-range values, strips a trailing `%`.
pub fn score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(score_from_value).unwrap_or(0))
}

fn score_from_value(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number
        .is_finite()
        .then(|| number.round().clamp(0.0, 100.0) as u8)
}

/// Free text. Numbers and booleans are stringified, anything else becomes empty.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Ordered list of non-blank strings. A bare string becomes a one-element list.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().filter_map(list_item).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    })
}

fn list_item(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Enumerated tag parsed with `FromStr`; unknown or missing values take the default.
pub fn tag<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.parse::<T>().unwrap_or_else(|e| {
            warn!("Ignoring model output: {e}");
            T::default()
        }),
        _ => T::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::Recommendation;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "score")]
        score: u8,
        #[serde(default, deserialize_with = "text")]
        text: String,
        #[serde(default, deserialize_with = "string_list")]
        list: Vec<String>,
        #[serde(default, deserialize_with = "tag")]
        tag: Recommendation,
    }

    fn probe(value: serde_json::Value) -> Probe {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let p = probe(json!({}));
        assert_eq!(p.score, 0);
        assert_eq!(p.text, "");
        assert!(p.list.is_empty());
        assert_eq!(p.tag, Recommendation::AVerifier);
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let p = probe(json!({ "score": null, "text": null, "list": null, "tag": null }));
        assert_eq!(p.score, 0);
        assert_eq!(p.text, "");
        assert!(p.list.is_empty());
        assert_eq!(p.tag, Recommendation::AVerifier);
    }

    #[test]
    fn test_score_coercions() {
        assert_eq!(probe(json!({ "score": 84.6 })).score, 85);
        assert_eq!(probe(json!({ "score": "72" })).score, 72);
        assert_eq!(probe(json!({ "score": "90 %" })).score, 90);
        assert_eq!(probe(json!({ "score": 250 })).score, 100);
        assert_eq!(probe(json!({ "score": -4 })).score, 0);
        assert_eq!(probe(json!({ "score": "high" })).score, 0);
        assert_eq!(probe(json!({ "score": [1] })).score, 0);
    }

    #[test]
    fn test_list_coercions() {
        let p = probe(json!({ "list": ["Python", " ", 3, null, { "x": 1 }, " SQL "] }));
        assert_eq!(p.list, vec!["Python", "3", "SQL"]);
        assert_eq!(probe(json!({ "list": "Rust" })).list, vec!["Rust"]);
        assert!(probe(json!({ "list": "" })).list.is_empty());
    }

    #[test]
    fn test_unknown_tag_defaults() {
        assert_eq!(
            probe(json!({ "tag": "PEUT-ETRE" })).tag,
            Recommendation::AVerifier
        );
        assert_eq!(
            probe(json!({ "tag": "shortlist" })).tag,
            Recommendation::Shortlist
        );
        assert_eq!(probe(json!({ "tag": 3 })).tag, Recommendation::AVerifier);
    }
}
