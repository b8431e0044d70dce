use serde_json::{Map, Value};
use taskboard_core::{fields, TaskboardError, TaskboardResult};

pub type Document = Map<String, Value>;

pub fn get_field<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    doc.as_object().and_then(|map| map.get(field))
}

/// The `_id` of a stored document. Every document the gateway writes has one.
pub fn document_id(doc: &Value) -> TaskboardResult<&str> {
    get_field(doc, fields::ID)
        .and_then(Value::as_str)
        .ok_or_else(|| TaskboardError::Storage("document has no string _id".to_string()))
}

pub fn as_document_mut(doc: &mut Value) -> TaskboardResult<&mut Document> {
    doc.as_object_mut()
        .ok_or_else(|| TaskboardError::Storage("document is not a JSON object".to_string()))
}
