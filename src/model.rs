//! Trained model artifact and prediction
//!
//! The serving process loads a fitted decision-tree regressor from a JSON
//! artifact at startup. The artifact is a flat node list: split nodes route
//! `x[feature] <= threshold` to the left child, leaves carry the predicted
//! value. Structure is validated once at load; prediction then walks the
//! tree per row without further checks and never panics.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TasarError};
use crate::table::{FeatureTable, FeatureValue};

/// One node of the fitted tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Internal split: rows with `x[feature] <= threshold` go left
    Split {
        /// Column index into the feature table
        feature: usize,
        /// Split threshold
        threshold: f64,
        /// Index of the left child node
        left: usize,
        /// Index of the right child node
        right: usize,
    },
    /// Terminal node carrying the regression output
    Leaf {
        /// Predicted value
        value: f64,
    },
}

/// Persisted form of a fitted tree
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeArtifact {
    feature_names: Vec<String>,
    nodes: Vec<TreeNode>,
}

/// A fitted decision-tree regressor
///
/// Immutable after load; shared read-only across request handlers.
#[derive(Debug, Clone)]
pub struct TreeModel {
    feature_names: Vec<String>,
    nodes: Vec<TreeNode>,
}

impl TreeModel {
    /// Load a model from a JSON artifact file
    ///
    /// # Errors
    ///
    /// Returns `TasarError::Config` if the file is missing or unreadable,
    /// the JSON is malformed, or the node structure is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            TasarError::config(format!("failed to read model {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse a model from JSON artifact text
    ///
    /// # Errors
    ///
    /// Returns `TasarError::Config` on malformed JSON or invalid structure.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let artifact: TreeArtifact = serde_json::from_str(text)
            .map_err(|e| TasarError::config(format!("model artifact is not valid JSON: {e}")))?;
        Self::from_parts(artifact.feature_names, artifact.nodes)
    }

    /// Build a model from its parts, validating tree structure
    ///
    /// Node 0 is the root. Children must come after their parent in the
    /// node list, which rules out cycles, and every split's feature index
    /// must address a declared feature.
    ///
    /// # Errors
    ///
    /// Returns `TasarError::Config` describing the first structural problem.
    pub fn from_parts(feature_names: Vec<String>, nodes: Vec<TreeNode>) -> Result<Self> {
        if feature_names.is_empty() {
            return Err(TasarError::config("model artifact declares no features"));
        }
        if nodes.is_empty() {
            return Err(TasarError::config("model artifact has no nodes"));
        }
        for (idx, node) in nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= feature_names.len() {
                    return Err(TasarError::config(format!(
                        "node {idx}: feature index {feature} out of range ({} features)",
                        feature_names.len()
                    )));
                }
                for child in [*left, *right] {
                    if child >= nodes.len() {
                        return Err(TasarError::config(format!(
                            "node {idx}: child index {child} out of range ({} nodes)",
                            nodes.len()
                        )));
                    }
                    if child <= idx {
                        return Err(TasarError::config(format!(
                            "node {idx}: child index {child} does not follow its parent"
                        )));
                    }
                }
            }
        }
        Ok(Self {
            feature_names,
            nodes,
        })
    }

    /// Small fitted tree over the seven canonical house-price features,
    /// for tests and demo serving
    pub fn demo() -> Result<Self> {
        let feature_names = [
            "LotArea",
            "YearBuilt",
            "1stFlrSF",
            "2ndFlrSF",
            "FullBath",
            "BedroomAbvGr",
            "TotRmsAbvGrd",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
        let nodes = vec![
            TreeNode::Split {
                feature: 0,
                threshold: 10_000.0,
                left: 1,
                right: 2,
            },
            TreeNode::Split {
                feature: 1,
                threshold: 1980.0,
                left: 3,
                right: 4,
            },
            TreeNode::Leaf { value: 310_000.0 },
            TreeNode::Leaf { value: 128_000.0 },
            TreeNode::Leaf { value: 205_000.0 },
        ];
        Self::from_parts(feature_names, nodes)
    }

    /// Number of features the model was fitted on
    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Feature names, in fitting order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Predict one value per table row, in row order
    ///
    /// # Errors
    ///
    /// Returns `TasarError::Prediction` if the table's column count does
    /// not match the model, a needed cell holds text, or a node reference
    /// is broken. Never panics.
    pub fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>> {
        if table.num_columns() != self.feature_names.len() {
            return Err(TasarError::Prediction {
                reason: format!(
                    "model expects {} features, table has {} columns",
                    self.feature_names.len(),
                    table.num_columns()
                ),
            });
        }
        table.rows().iter().map(|row| self.predict_row(row)).collect()
    }

    fn predict_row(&self, row: &[FeatureValue]) -> Result<f64> {
        let mut idx = 0;
        loop {
            let node = self.nodes.get(idx).ok_or_else(|| TasarError::Prediction {
                reason: format!("broken node reference {idx}"),
            })?;
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = match row.get(*feature) {
                        Some(FeatureValue::Int(i)) => *i as f64,
                        Some(FeatureValue::Float(f)) => *f,
                        Some(FeatureValue::Str(s)) => {
                            return Err(TasarError::Prediction {
                                reason: format!("could not convert string to float: '{s}'"),
                            });
                        }
                        None => {
                            return Err(TasarError::Prediction {
                                reason: format!("row has no column {feature}"),
                            });
                        }
                    };
                    idx = if x <= *threshold { *left } else { *right };
                }
            }
        }
    }
}
