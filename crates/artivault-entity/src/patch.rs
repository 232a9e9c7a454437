//! Serde support for partial updates.

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable patch field.
///
/// Pair with `#[serde(default)]`: a missing key stays `None` (leave as is),
/// an explicit `null` becomes `Some(None)` (clear), and a value becomes
/// `Some(Some(v))`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
