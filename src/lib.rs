//! # Tasar
//!
//! Tasar (Spanish: "to appraise") is a minimal model-serving HTTP API for
//! tabular regression. It loads a pre-trained decision-tree model and a
//! feature schema at startup, validates incoming prediction requests against
//! that schema, and returns numeric predictions.
//!
//! The core of the crate is the request pipeline between raw JSON input and
//! the model's numeric feature vector:
//!
//! 1. Normalize the body to a batch of records
//! 2. Presence validation ([`validate::validate_presence`])
//! 3. Type coercion with a non-negativity policy ([`validate::coerce_and_check`])
//! 4. Fixed-column table assembly ([`table::FeatureTable`])
//! 5. Model invocation ([`model::TreeModel::predict`])
//!
//! Each stage fails fast with a descriptive error; later stages never run if
//! an earlier one fails for any record in the batch.
//!
//! ## Example
//!
//! ```rust
//! use tasar::schema::FeatureSchema;
//! use tasar::table::FeatureTable;
//! use tasar::validate::{coerce_and_check, validate_presence};
//!
//! let schema = FeatureSchema::from_json_str(r#"{"sqft": "int", "baths": "int"}"#).unwrap();
//! let mut records = vec![serde_json::json!({"sqft": "1200", "baths": 2})];
//!
//! validate_presence(&records, &schema).unwrap();
//! coerce_and_check(&mut records, &schema).unwrap();
//! let table = FeatureTable::from_records(&records, &schema).unwrap();
//! assert_eq!(table.num_rows(), 1);
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // i64 -> f64 for tree thresholds is acceptable
#![allow(clippy::cast_possible_truncation)] // float -> int coercion truncates by design
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod error;
pub mod model;
pub mod schema;
pub mod table;
pub mod validate;

pub use error::{Result, TasarError};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
