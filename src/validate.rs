//! Record validation and type coercion
//!
//! Two stages sit between a parsed request body and the feature table:
//!
//! 1. [`validate_presence`] — per record, checks that the record exists, has
//!    exactly the schema's fields, and carries no nulls. Fail-fast: the first
//!    failing check of the first failing record aborts the whole batch.
//! 2. [`coerce_and_check`] — per record, coerces every field to its declared
//!    type in place and applies the non-negativity policy to numeric fields.
//!    Per-field errors are collected before the record is judged; type errors
//!    take precedence over value errors. Still fail-fast across records.
//!
//! The asymmetry between the stages (short-circuit vs collect-then-join) is
//! deliberate and callers depend on the exact message formats.

use serde_json::Value;

use crate::error::{Result, TasarError};
use crate::schema::{FeatureSchema, FeatureType};
use crate::table::FeatureValue;

/// Render a field list the way the original service did:
/// square brackets, single-quoted names, comma-space separated.
fn quote_list(names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// Check every record for presence problems before any coercion runs
///
/// Per record at index `i`, in order: absent/null record, missing required
/// fields (schema order), unexpected fields (record order), null values
/// (schema order). The first failing check aborts the batch; one invalid
/// record invalidates the entire request.
///
/// # Errors
///
/// Returns `TasarError::Validation` carrying the first offending record's
/// message.
pub fn validate_presence(records: &[Value], schema: &FeatureSchema) -> Result<()> {
    for (idx, slot) in records.iter().enumerate() {
        let record = match slot {
            Value::Object(map) => map,
            Value::Null => {
                return Err(TasarError::validation(format!(
                    "Record {idx}: No input data provided"
                )));
            }
            _ => {
                return Err(TasarError::validation(format!(
                    "Record {idx}: Invalid input format: expected a JSON object"
                )));
            }
        };

        let missing: Vec<&str> = schema
            .field_names()
            .filter(|name| !record.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(TasarError::validation(format!(
                "Record {idx}: Missing required fields: {}",
                quote_list(&missing)
            )));
        }

        let extra: Vec<&str> = record
            .keys()
            .map(String::as_str)
            .filter(|key| !schema.contains(key))
            .collect();
        if !extra.is_empty() {
            return Err(TasarError::validation(format!(
                "Record {idx}: Unexpected fields provided: {}",
                quote_list(&extra)
            )));
        }

        let nulls: Vec<&str> = schema
            .field_names()
            .filter(|name| matches!(record.get(*name), Some(Value::Null)))
            .collect();
        if !nulls.is_empty() {
            return Err(TasarError::validation(format!(
                "Record {idx}: Fields cannot be null: {}",
                quote_list(&nulls)
            )));
        }
    }
    Ok(())
}

/// Coerce every field of every record to its declared type, in place
///
/// Fields are visited in schema order. All of a record's per-field errors
/// are collected before the record passes or fails; if any type errors
/// exist, value errors for that record are suppressed. Processing stops at
/// the first record with any error.
///
/// # Errors
///
/// Returns `TasarError::Validation` with either
/// `"Record {i}: Invalid input format: Type errors - ..."` or
/// `"Record {i}: Invalid values: ..."`.
pub fn coerce_and_check(records: &mut [Value], schema: &FeatureSchema) -> Result<()> {
    for (idx, slot) in records.iter_mut().enumerate() {
        let Value::Object(record) = slot else {
            // validate_presence guarantees objects; anything else is an
            // internal-consistency failure
            return Err(TasarError::Assembly {
                detail: format!("record {idx} is not an object"),
            });
        };

        let mut type_errors: Vec<String> = Vec::new();
        let mut invalid_values: Vec<String> = Vec::new();

        for (field, ty) in schema.iter() {
            let Some(value) = record.get(field).cloned() else {
                // guaranteed present by validate_presence
                continue;
            };
            if value.is_null() {
                type_errors.push(format!("Field '{field}' cannot be null"));
                continue;
            }
            match coerce_value(&value, ty) {
                Ok(coerced) => {
                    let negative = coerced.as_f64().is_some_and(|x| x < 0.0);
                    match coerced.into_json() {
                        Some(json) => {
                            record.insert(field.to_string(), json);
                        }
                        None => {
                            // non-finite float, unrepresentable in JSON
                            type_errors.push(type_error_message(field, ty, &value));
                            continue;
                        }
                    }
                    if ty.is_numeric() && negative {
                        invalid_values
                            .push(format!("Field '{field}' must be a non-negative number"));
                    }
                }
                Err(()) => type_errors.push(type_error_message(field, ty, &value)),
            }
        }

        if !type_errors.is_empty() {
            return Err(TasarError::validation(format!(
                "Record {idx}: Invalid input format: Type errors - {}",
                type_errors.join(", ")
            )));
        }
        if !invalid_values.is_empty() {
            return Err(TasarError::validation(format!(
                "Record {idx}: Invalid values: {}",
                invalid_values.join(", ")
            )));
        }
    }
    Ok(())
}

fn type_error_message(field: &str, ty: FeatureType, original: &Value) -> String {
    format!(
        "Field '{field}' must be of type {} (got value '{}')",
        ty.name(),
        render_raw(original)
    )
}

/// Original value as it appears in error messages: strings bare, everything
/// else in JSON notation
fn render_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convert one raw JSON scalar to the declared type
///
/// Mirrors permissive scalar construction: numeric strings parse, floats
/// truncate toward zero for integer fields, bools count as 0/1, and text
/// fields accept a rendition of anything.
fn coerce_value(value: &Value, ty: FeatureType) -> std::result::Result<FeatureValue, ()> {
    match ty {
        FeatureType::Integer => match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FeatureValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    if f.is_finite() {
                        Ok(FeatureValue::Int(f.trunc() as i64))
                    } else {
                        Err(())
                    }
                } else {
                    Err(())
                }
            }
            Value::Bool(b) => Ok(FeatureValue::Int(i64::from(*b))),
            Value::String(s) => s.trim().parse::<i64>().map(FeatureValue::Int).map_err(|_| ()),
            _ => Err(()),
        },
        FeatureType::Float => match value {
            Value::Number(n) => n.as_f64().map(FeatureValue::Float).ok_or(()),
            Value::Bool(b) => Ok(FeatureValue::Float(if *b { 1.0 } else { 0.0 })),
            Value::String(s) => {
                let parsed = s.trim().parse::<f64>().map_err(|_| ())?;
                if parsed.is_finite() {
                    Ok(FeatureValue::Float(parsed))
                } else {
                    Err(())
                }
            }
            _ => Err(()),
        },
        FeatureType::Text => match value {
            Value::String(s) => Ok(FeatureValue::Str(s.clone())),
            Value::Number(n) => Ok(FeatureValue::Str(n.to_string())),
            Value::Bool(b) => Ok(FeatureValue::Str(b.to_string())),
            other => Ok(FeatureValue::Str(other.to_string())),
        },
    }
}
