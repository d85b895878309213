//! Serde helpers for backend payloads

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as the type's default value
///
/// The backend sends `null` for unset text and flag fields; use with
/// `#[serde(default, deserialize_with = "common::de::null_as_default")]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
