pub mod email_validator;
pub mod timestamps;

use serde::{Deserialize, Deserializer};

/// Distinguishes an explicit `null` from a missing field:
/// use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>` so that absent -> `None`, null -> `Some(None)`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
