//! Scalar decoders that accept any YAML scalar where the rule set expects
//! text (`draft: True`, `size-below: "10"`, `age: 30`, `title: 123`).
//!
//! Values are kept as written; conditions interpret them when they run, so
//! one bad parameter never invalidates the whole document.

use serde::{Deserialize, Deserializer};
use tracing::warn;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

/// Accepts the spellings `1 t T true TRUE True 0 f F false FALSE False`.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Any scalar, as text.
pub fn scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Scalar::deserialize(deserializer)?.into_text())
}

/// An optional scalar, as text. `null` is absent.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
}

/// A list of scalars, as text. `null` is an empty list.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Scalar>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(Scalar::into_text)
        .collect())
}

/// A switch that defaults to off. Unrecognised spellings are ignored.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = opt_string(deserializer)? else {
        return Ok(false);
    };
    if raw.trim().is_empty() {
        return Ok(false);
    }
    Ok(parse_bool(&raw).unwrap_or_else(|| {
        warn!("Ignoring invalid boolean `{raw}`, treating it as false");
        false
    }))
}
