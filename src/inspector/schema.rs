//! Sample-based column inference
//!
//! Columns come from a single document. This is a cheap heuristic, not a
//! schema: fields missing from the sample are not reported, and a field's
//! type in other documents may differ.

use bson::{Bson, Document};
use serde::Serialize;
use std::fmt;

/// Observed type of one field in the sample document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InferredType {
    String,
    Number,
    Boolean,
    ObjectId,
    Date,
    Array,
    Object,
    Undefined,
}

impl InferredType {
    /// Classify a value: object id, then date, then array, then primitive kind
    pub fn of(value: &Bson) -> Self {
        match value {
            Bson::ObjectId(_) => Self::ObjectId,
            Bson::DateTime(_) | Bson::Timestamp(_) => Self::Date,
            Bson::Array(_) => Self::Array,
            Bson::String(_) | Bson::Symbol(_) | Bson::JavaScriptCode(_) => Self::String,
            Bson::Double(_) | Bson::Int32(_) | Bson::Int64(_) => Self::Number,
            Bson::Boolean(_) => Self::Boolean,
            Bson::Undefined => Self::Undefined,
            // Embedded documents, null, binary, regex, decimal128, keys, pointers
            _ => Self::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::ObjectId => "objectId",
            Self::Date => "date",
            Self::Array => "array",
            Self::Object => "object",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inferred column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub column_name: String,
    pub data_type: InferredType,
}

/// Columns of `sample`, in field order
pub fn infer_columns(sample: &Document) -> Vec<Column> {
    sample
        .iter()
        .map(|(name, value)| Column {
            column_name: name.clone(),
            data_type: InferredType::of(value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId, DateTime};

    #[test]
    fn test_infer_mixed_document() {
        let sample = doc! {
            "_id": ObjectId::new(),
            "name": "a",
            "tags": ["x"],
            "when": DateTime::now(),
            "active": true,
        };

        let types: Vec<InferredType> = infer_columns(&sample)
            .into_iter()
            .map(|c| c.data_type)
            .collect();

        assert_eq!(
            types,
            vec![
                InferredType::ObjectId,
                InferredType::String,
                InferredType::Array,
                InferredType::Date,
                InferredType::Boolean,
            ]
        );
    }

    #[test]
    fn test_infer_primitive_kinds() {
        let sample = doc! {
            "int": 1_i32,
            "long": 2_i64,
            "double": 1.5,
            "nested": { "a": 1 },
            "nothing": Bson::Null,
            "missing": Bson::Undefined,
        };

        let columns = infer_columns(&sample);
        let names: Vec<&str> = columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, vec!["int", "long", "double", "nested", "nothing", "missing"]);

        let types: Vec<&str> = columns.iter().map(|c| c.data_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["number", "number", "number", "object", "object", "undefined"]
        );
    }

    #[test]
    fn test_column_serialization() {
        let column = Column {
            column_name: "_id".into(),
            data_type: InferredType::ObjectId,
        };
        assert_eq!(
            serde_json::to_value(&column).unwrap(),
            serde_json::json!({ "column_name": "_id", "data_type": "objectId" })
        );
    }

    #[test]
    fn test_empty_sample_has_no_columns() {
        assert!(infer_columns(&Document::new()).is_empty());
    }
}
