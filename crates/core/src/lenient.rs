//! Tolerant decoders for fields that older forms submitted as strings.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Accept `"123"`, `123` or `null` and keep the textual form.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => String::new(),
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Int(n)) => n.to_string(),
        Some(Scalar::Float(f)) => f.to_string(),
    })
}

/// A display-only string the server may send as `null`.
pub(crate) fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a missing/null/empty value, a number, or a numeric string.
pub(crate) fn optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        Some(Scalar::Int(n)) => u32::try_from(n).map(Some).map_err(serde::de::Error::custom),
        Some(Scalar::Float(f)) if f.is_finite() && f >= 0.0 && f <= f64::from(u32::MAX) => {
            Ok(Some(f as u32))
        }
        Some(Scalar::Float(f)) => Err(serde::de::Error::custom(format!("out of range: {f}"))),
    }
}
