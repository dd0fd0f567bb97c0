use crate::core::{OrmError, Result, Value};
use serde::{Deserialize, Serialize};

/// Reference snapshot of a collection: its entity type and identifiers.
///
/// Row data is not kept. Unpacking re-reads whatever the identifiers point at
/// when it runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedCollection {
    pub entity_type: String,
    pub identifiers: Vec<Value>,
}

impl PackedCollection {
    pub fn new(entity_type: impl Into<String>, identifiers: Vec<Value>) -> Self {
        Self {
            entity_type: entity_type.into(),
            identifiers,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self)
            .map_err(|e| OrmError::Serialization(format!("Failed to encode collection: {}", e)))
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes)
            .map_err(|e| OrmError::Serialization(format!("Failed to decode collection: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed() -> PackedCollection {
        PackedCollection::new("User", vec![Value::Integer(4), Value::Text("a-7".into())])
    }

    #[test]
    fn test_json_shape() {
        let json = packed().to_json().unwrap();
        assert_eq!(json, r#"{"entityType":"User","identifiers":[4,"a-7"]}"#);
        assert_eq!(PackedCollection::from_json(&json).unwrap(), packed());
    }

    #[test]
    fn test_msgpack_form() {
        let bytes = packed().to_msgpack().unwrap();
        assert_eq!(PackedCollection::from_msgpack(&bytes).unwrap(), packed());
        assert!(matches!(
            PackedCollection::from_msgpack(&[0xc1]),
            Err(OrmError::Serialization(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            PackedCollection::from_json(r#"{"identifiers":[1]}"#),
            Err(OrmError::Serialization(_))
        ));
    }
}
