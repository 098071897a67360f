use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Field mapping of a single entity (field name -> arbitrary JSON value)
pub type FieldMap = Map<String, Value>;

/// The whole world: entity name -> field mapping
pub type World = HashMap<String, FieldMap>;

/// Post-mutation snapshot of one entity, delivered to every subscriber.
///
/// Serializes as a single-key object: `{"ball1": {"x": 5, "y": 7}}`.
/// Notifications are full snapshots, never diffs.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// Entity name (e.g., "ball1")
    pub entity: String,

    /// Entity state at the time the notification was produced
    pub fields: FieldMap,
}

impl Notification {
    pub fn new(entity: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            entity: entity.into(),
            fields,
        }
    }

    /// Render the wire payload queued for subscribers
    pub fn to_payload(&self) -> String {
        // Map<String, Value> with a string key cannot fail to serialize
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

impl Serialize for Notification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.entity, &self.fields)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_serializes_as_single_entity_object() {
        let mut fields = FieldMap::new();
        fields.insert("x".to_string(), json!(5));
        fields.insert("colour".to_string(), json!("red"));

        let payload = Notification::new("ball1", fields).to_payload();
        let parsed: Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(parsed, json!({"ball1": {"x": 5, "colour": "red"}}));
    }

    #[test]
    fn empty_entity_serializes_with_empty_object() {
        let payload = Notification::new("ghost", FieldMap::new()).to_payload();
        assert_eq!(payload, r#"{"ghost":{}}"#);
    }
}
