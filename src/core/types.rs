use super::Value;
use indexmap::IndexMap;

/// One result row keyed by column name, in projection order.
pub type Row = IndexMap<String, Value>;

/// Builds a [`Row`] from `(column, value)` pairs.
pub fn row<K, V, I>(pairs: I) -> Row
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Current time as Unix epoch seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
