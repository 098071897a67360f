use crate::state::{FieldMap, World};

/// Decode a request body carrying a single entity's field mapping
pub fn decode_fields(body: &[u8]) -> Result<FieldMap, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Decode a world mapping: an inbound text frame or a `POST /world` body
///
/// `{"ball1": {"x": 5}, "ball2": {"colour": "red"}}`. Every entity value
/// must be an object; anything else rejects the whole message.
pub fn decode_world(body: &[u8]) -> Result<World, serde_json::Error> {
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_multi_entity_update() {
        let world = decode_world(br#"{"ball1": {"x": 5}, "ball2": {"colour": "red"}}"#).unwrap();

        assert_eq!(world.len(), 2);
        assert_eq!(world["ball1"]["x"], json!(5));
        assert_eq!(world["ball2"]["colour"], json!("red"));
    }

    #[test]
    fn rejects_non_json() {
        assert!(decode_world(b"not json").is_err());
    }

    #[test]
    fn rejects_non_object_entity() {
        assert!(decode_world(br#"{"ball1": 5}"#).is_err());
        assert!(decode_world(br#"{"a": {}, "b": "nope"}"#).is_err());
    }

    #[test]
    fn rejects_top_level_array() {
        assert!(decode_world(br#"[{"ball1": {}}]"#).is_err());
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(decode_world(b"{}").unwrap().is_empty());
    }

    #[test]
    fn decodes_field_body() {
        let fields = decode_fields(br#"{"x": 1, "nested": {"a": [1, 2]}}"#).unwrap();
        assert_eq!(fields["nested"], json!({"a": [1, 2]}));
        assert!(decode_fields(b"[1]").is_err());
    }

    #[test]
    fn null_fields_are_kept() {
        let world = decode_world(br#"{"a": {}, "b": {"y": null}}"#).unwrap();
        assert_eq!(world.len(), 2);
        assert_eq!(world["b"]["y"], json!(null));
    }
}
