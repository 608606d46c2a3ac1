//! Tolerant field decoders for stored records.
//!
//! Stored projects are written by several generations of clients. A field that is
//! `null` or has an unexpected shape falls back to its default instead of rejecting
//! the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Read `null` as the field's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read any value that does not decode as `T` as the field's default.
///
/// Only malformed JSON text is still an error.
pub(crate) fn default_on_mismatch<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
