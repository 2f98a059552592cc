//! Feature schema loading
//!
//! The schema is a JSON object mapping feature names to one of the type tags
//! `"int"`, `"float"`, or `"str"`. It is loaded once at startup and drives
//! everything downstream: which fields a request must carry, how raw values
//! are coerced, and the column order of the assembled feature table.
//!
//! Field order is insertion order of the JSON object, not alphabetical, and
//! is load-bearing: validation error messages and table columns follow it.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, TasarError};

/// Scalar type a feature may declare
///
/// Closed set: the serving layer supports exactly these three tags and
/// rejects schemas declaring anything else at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureType {
    /// Whole numbers; coerced from integers, floats (truncating), bools,
    /// and integer-formatted strings
    Integer,
    /// Floating-point numbers; coerced from any JSON number, bools, and
    /// numeric strings
    Float,
    /// Text; any scalar renders to text (lossy, allowed)
    Text,
}

impl FeatureType {
    /// Tag used in schema files and in validation error messages
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "int",
            Self::Float => "float",
            Self::Text => "str",
        }
    }

    /// Parse a schema file tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "int" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "str" => Some(Self::Text),
            _ => None,
        }
    }

    /// Whether the non-negativity policy applies to this type
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

/// Ordered mapping of required feature names to their declared types
///
/// Immutable after load. Shared read-only across request handlers.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    fields: Vec<(String, FeatureType)>,
}

impl FeatureSchema {
    /// Build a schema from an ordered field list
    ///
    /// # Errors
    ///
    /// Returns `TasarError::Config` if the list is empty or a name repeats.
    pub fn new(fields: Vec<(String, FeatureType)>) -> Result<Self> {
        if fields.is_empty() {
            return Err(TasarError::config("feature schema must not be empty"));
        }
        for (i, (name, _)) in fields.iter().enumerate() {
            if fields[..i].iter().any(|(other, _)| other == name) {
                return Err(TasarError::config(format!(
                    "duplicate field '{name}' in feature schema"
                )));
            }
        }
        Ok(Self { fields })
    }

    /// Parse a schema from JSON text
    ///
    /// The document must be an object whose values are all `"int"`,
    /// `"float"`, or `"str"`.
    ///
    /// # Errors
    ///
    /// Returns `TasarError::Config` on malformed JSON, a non-object top
    /// level, an empty object, or an unrecognized type tag.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| TasarError::config(format!("feature schema is not valid JSON: {e}")))?;
        let Value::Object(map) = value else {
            return Err(TasarError::config(
                "feature schema must be a JSON object mapping field names to types",
            ));
        };
        let mut fields = Vec::with_capacity(map.len());
        for (name, tag) in &map {
            let Value::String(tag) = tag else {
                return Err(TasarError::config(format!(
                    "field '{name}': type must be a string, one of \"int\", \"float\", \"str\""
                )));
            };
            let ty = FeatureType::from_tag(tag).ok_or_else(|| {
                TasarError::config(format!(
                    "field '{name}': unrecognized type \"{tag}\" (expected \"int\", \"float\", or \"str\")"
                ))
            })?;
            fields.push((name.clone(), ty));
        }
        Self::new(fields)
    }

    /// Load a schema from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `TasarError::Config` if the file is missing or unreadable,
    /// or its content fails [`FeatureSchema::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            TasarError::config(format!(
                "failed to read feature schema {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false: construction rejects empty schemas
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, FeatureType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Whether a field name is declared
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    /// Field names in schema order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_str_preserves_order() {
        let schema = FeatureSchema::from_json_str(
            r#"{"LotArea": "int", "YearBuilt": "int", "1stFlrSF": "float"}"#,
        )
        .expect("valid schema");
        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(names, vec!["LotArea", "YearBuilt", "1stFlrSF"]);
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_from_json_str_type_tags() {
        let schema =
            FeatureSchema::from_json_str(r#"{"a": "int", "b": "float", "c": "str"}"#)
                .expect("valid schema");
        let types: Vec<FeatureType> = schema.iter().map(|(_, ty)| ty).collect();
        assert_eq!(
            types,
            vec![FeatureType::Integer, FeatureType::Float, FeatureType::Text]
        );
    }

    #[test]
    fn test_unrecognized_type_tag_rejected() {
        let err = FeatureSchema::from_json_str(r#"{"a": "double"}"#).unwrap_err();
        assert!(err.to_string().contains("unrecognized type"));
        assert!(err.to_string().contains("double"));
    }

    #[test]
    fn test_non_object_schema_rejected() {
        assert!(FeatureSchema::from_json_str(r#"["int"]"#).is_err());
        assert!(FeatureSchema::from_json_str("not json").is_err());
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert!(FeatureSchema::from_json_str("{}").is_err());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let fields = vec![
            ("a".to_string(), FeatureType::Integer),
            ("a".to_string(), FeatureType::Float),
        ];
        assert!(FeatureSchema::new(fields).is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = FeatureSchema::load("/nonexistent/features.json").unwrap_err();
        assert!(matches!(err, TasarError::Config { .. }));
    }

    #[test]
    fn test_feature_type_names() {
        assert_eq!(FeatureType::Integer.name(), "int");
        assert_eq!(FeatureType::Float.name(), "float");
        assert_eq!(FeatureType::Text.name(), "str");
        assert!(FeatureType::Integer.is_numeric());
        assert!(FeatureType::Float.is_numeric());
        assert!(!FeatureType::Text.is_numeric());
    }
}
