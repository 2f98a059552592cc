//! Feature table assembly
//!
//! Converts a batch of validated, coerced records into a fixed-column table
//! the model consumes. Columns follow schema order regardless of the key
//! order of any individual record. By the time records reach this stage the
//! validator guarantees every record carries exactly the schema's fields
//! with coerced values; anything else is an internal-consistency failure.

use serde_json::{Number, Value};

use crate::error::{Result, TasarError};
use crate::schema::{FeatureSchema, FeatureType};

/// A coerced scalar cell
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Integer feature
    Int(i64),
    /// Floating-point feature
    Float(f64),
    /// Text feature
    Str(String),
}

impl FeatureValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Str(_) => None,
        }
    }

    pub(crate) fn into_json(self) -> Option<Value> {
        match self {
            Self::Int(i) => Some(Value::Number(Number::from(i))),
            Self::Float(f) => Number::from_f64(f).map(Value::Number),
            Self::Str(s) => Some(Value::String(s)),
        }
    }
}

/// Row-major table with one row per record and one column per schema field
#[derive(Debug, Clone)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<FeatureValue>>,
}

impl FeatureTable {
    /// Assemble a table from validated records
    ///
    /// Columns are fixed to schema order. Each cell is read back from the
    /// coerced record and must match its declared type exactly.
    ///
    /// # Errors
    ///
    /// Returns `TasarError::Assembly` if a record is not an object, lost a
    /// schema field, or holds a value of the wrong shape for its column.
    /// These indicate a bug upstream, not caller error, but are still
    /// reported as a 400-class failure rather than crashing the process.
    pub fn from_records(records: &[Value], schema: &FeatureSchema) -> Result<Self> {
        let columns: Vec<String> = schema.field_names().map(str::to_string).collect();
        let mut rows = Vec::with_capacity(records.len());

        for (idx, slot) in records.iter().enumerate() {
            let Value::Object(record) = slot else {
                return Err(TasarError::Assembly {
                    detail: format!("record {idx} is not an object"),
                });
            };
            let mut row = Vec::with_capacity(columns.len());
            for (field, ty) in schema.iter() {
                let value = record.get(field).ok_or_else(|| TasarError::Assembly {
                    detail: format!("record {idx} is missing field '{field}'"),
                })?;
                row.push(cell_from_value(value, ty).ok_or_else(|| TasarError::Assembly {
                    detail: format!("record {idx} field '{field}' has an uncoerced value"),
                })?);
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in schema order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows, in input order
    pub fn rows(&self) -> &[Vec<FeatureValue>] {
        &self.rows
    }
}

fn cell_from_value(value: &Value, ty: FeatureType) -> Option<FeatureValue> {
    match (ty, value) {
        (FeatureType::Integer, Value::Number(n)) => n.as_i64().map(FeatureValue::Int),
        (FeatureType::Float, Value::Number(n)) => n.as_f64().map(FeatureValue::Float),
        (FeatureType::Text, Value::String(s)) => Some(FeatureValue::Str(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> FeatureSchema {
        FeatureSchema::from_json_str(r#"{"a": "int", "b": "float", "c": "str"}"#)
            .expect("test schema")
    }

    #[test]
    fn test_columns_follow_schema_order() {
        // record keys deliberately out of schema order
        let records = vec![json!({"c": "x", "a": 1, "b": 2.5})];
        let table = FeatureTable::from_records(&records, &schema()).expect("table");
        assert_eq!(table.columns(), &["a", "b", "c"]);
        assert_eq!(
            table.rows()[0],
            vec![
                FeatureValue::Int(1),
                FeatureValue::Float(2.5),
                FeatureValue::Str("x".to_string())
            ]
        );
    }

    #[test]
    fn test_one_row_per_record() {
        let records = vec![
            json!({"a": 1, "b": 1.0, "c": "p"}),
            json!({"a": 2, "b": 2.0, "c": "q"}),
            json!({"a": 3, "b": 3.0, "c": "r"}),
        ];
        let table = FeatureTable::from_records(&records, &schema()).expect("table");
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 3);
        assert_eq!(table.rows()[2][0], FeatureValue::Int(3));
    }

    #[test]
    fn test_empty_batch_builds_empty_table() {
        let table = FeatureTable::from_records(&[], &schema()).expect("table");
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 3);
    }

    #[test]
    fn test_missing_field_is_assembly_error() {
        let records = vec![json!({"a": 1, "b": 1.0})];
        let err = FeatureTable::from_records(&records, &schema()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid input format:"));
        assert!(err.to_string().contains("'c'"));
    }

    #[test]
    fn test_uncoerced_value_is_assembly_error() {
        // a string where an int column expects a number means coercion never ran
        let records = vec![json!({"a": "1", "b": 1.0, "c": "x"})];
        let err = FeatureTable::from_records(&records, &schema()).unwrap_err();
        assert!(matches!(err, TasarError::Assembly { .. }));
    }

    #[test]
    fn test_feature_value_as_f64() {
        assert_eq!(FeatureValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(FeatureValue::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(FeatureValue::Str("x".to_string()).as_f64(), None);
    }
}
