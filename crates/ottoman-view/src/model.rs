use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Map source plus optional reduce source.
///
/// A reduce source of `_count`, `_sum` or `_stats` selects a built-in
/// reducer instead of script code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub map: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduce: Option<String>,
}

impl View {
    pub fn new(map: impl Into<String>) -> Self {
        Self {
            map: map.into(),
            reduce: None,
        }
    }

    pub fn with_reduce(mut self, reduce: impl Into<String>) -> Self {
        self.reduce = Some(reduce.into());
        self
    }
}

/// A named set of views, as stored under `_design/<name>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub views: BTreeMap<String, View>,
}

impl DesignDocument {
    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Keep only map rows whose key equals this one.
    #[serde(default)]
    pub key: Option<Value>,
    /// Reduce per distinct key instead of over all rows.
    #[serde(default)]
    pub group: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<Value>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_group(mut self, group: bool) -> Self {
        self.group = group;
        self
    }
}

/// One `emit(key, value)` call from the map phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittedRow {
    pub id: Value,
    pub key: Value,
    pub value: Value,
}

/// One reduce result. `key` is `null` for ungrouped reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedRow {
    pub key: Value,
    pub value: Value,
}

/// Rows produced by a view: map rows when it has no reduce, reduced rows
/// otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewResult {
    Map(Vec<EmittedRow>),
    Reduce(Vec<ReducedRow>),
}

impl ViewResult {
    pub fn len(&self) -> usize {
        match self {
            ViewResult::Map(rows) => rows.len(),
            ViewResult::Reduce(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_map(&self) -> Option<&[EmittedRow]> {
        match self {
            ViewResult::Map(rows) => Some(rows),
            ViewResult::Reduce(_) => None,
        }
    }

    pub fn as_reduce(&self) -> Option<&[ReducedRow]> {
        match self {
            ViewResult::Map(_) => None,
            ViewResult::Reduce(rows) => Some(rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn design_document_from_json() {
        let ddoc: DesignDocument = serde_json::from_value(json!({
            "_id": "_design/sales",
            "views": {
                "by_category": {"map": "emit(doc.category, 1)", "reduce": "_sum"},
                "all": {"map": "emit(doc._id, nil)"}
            }
        }))
        .unwrap();
        assert_eq!(ddoc.id, "_design/sales");
        assert_eq!(
            ddoc.view("by_category"),
            Some(&View::new("emit(doc.category, 1)").with_reduce("_sum"))
        );
        assert_eq!(ddoc.view("all").and_then(|v| v.reduce.as_ref()), None);
        assert!(ddoc.view("missing").is_none());
    }

    #[test]
    fn query_defaults() {
        let query: Query = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query, Query::new());
        assert!(!query.group);
        assert!(query.key.is_none());
    }

    #[test]
    fn result_serializes_as_rows() {
        let result = ViewResult::Reduce(vec![ReducedRow {
            key: Value::Null,
            value: json!(3),
        }]);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!([{"key": null, "value": 3}])
        );
    }
}
