use serde_json::Value;

use crate::error::DocumentError;

const ID_FIELD: &str = "_id";

/// A JSON object handed to the map function.
#[derive(Debug, Clone, PartialEq)]
pub struct Document(Value);

impl Document {
    /// The `_id` field, or `null` when the document has none.
    pub fn id(&self) -> Value {
        self.0.get(ID_FIELD).cloned().unwrap_or(Value::Null)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(_) => Ok(Self(value)),
            other => Err(DocumentError(format!(
                "expected a JSON object, got {}",
                kind(&other)
            ))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Types that can be presented to a view as a [`Document`].
///
/// Implemented for [`serde_json::Value`] (owned and borrowed),
/// [`bson::Document`], and JSON text.
pub trait IntoDocument {
    fn into_document(self) -> Result<Document, DocumentError>;
}

impl IntoDocument for Document {
    fn into_document(self) -> Result<Document, DocumentError> {
        Ok(self)
    }
}

impl IntoDocument for &Document {
    fn into_document(self) -> Result<Document, DocumentError> {
        Ok(self.clone())
    }
}

impl IntoDocument for Value {
    fn into_document(self) -> Result<Document, DocumentError> {
        Document::try_from(self)
    }
}

impl IntoDocument for &Value {
    fn into_document(self) -> Result<Document, DocumentError> {
        Document::try_from(self.clone())
    }
}

impl IntoDocument for bson::Document {
    fn into_document(self) -> Result<Document, DocumentError> {
        let value = serde_json::to_value(&self).map_err(|e| DocumentError(e.to_string()))?;
        Document::try_from(value)
    }
}

impl IntoDocument for &str {
    fn into_document(self) -> Result<Document, DocumentError> {
        let value: Value =
            serde_json::from_str(self).map_err(|e| DocumentError(format!("invalid JSON: {e}")))?;
        Document::try_from(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn id_of_document() {
        let doc = json!({"_id": "a1", "n": 1}).into_document().unwrap();
        assert_eq!(doc.id(), json!("a1"));
    }

    #[test]
    fn into_value_returns_the_object() {
        let value = json!({"_id": "a1", "tags": ["x"]});
        let doc = value.clone().into_document().unwrap();
        assert_eq!(doc.into_value(), value);
    }

    #[test]
    fn missing_id_is_null() {
        let doc = json!({"n": 1}).into_document().unwrap();
        assert_eq!(doc.id(), Value::Null);
    }

    #[test]
    fn non_object_rejected() {
        let err = json!([1, 2]).into_document().unwrap_err();
        assert!(err.0.contains("an array"));
    }

    #[test]
    fn json_text() {
        let doc = r#"{"_id": "t", "tags": ["x"]}"#.into_document().unwrap();
        assert_eq!(doc.as_value()["tags"], json!(["x"]));
        assert!("{not json".into_document().is_err());
    }

    #[test]
    fn bson_document() {
        let doc = bson::doc! { "_id": "b1", "qty": 3_i64, "tags": ["x", "y"] }
            .into_document()
            .unwrap();
        assert_eq!(doc.id(), json!("b1"));
        assert_eq!(doc.as_value()["qty"], json!(3));
        assert_eq!(doc.as_value()["tags"], json!(["x", "y"]));
    }
}
