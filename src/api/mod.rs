//! HTTP API for model serving
//!
//! Provides REST endpoints for schema-validated tabular prediction using axum.
//!
//! ## Endpoints
//!
//! - `GET /` - Hello greeting
//! - `GET /health` - Health check
//! - `POST /predict` - Predict for a single record or a batch of records
//!
//! ## Example
//!
//! ```rust,ignore
//! use tasar::api::{create_router, AppState};
//!
//! let state = AppState::demo()?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::TasarError,
    model::TreeModel,
    schema::FeatureSchema,
    table::FeatureTable,
    validate::{coerce_and_check, validate_presence},
};


/// Application state shared across handlers
///
/// Schema and model are loaded once at startup and never mutated; cloning
/// the state clones two `Arc`s.
#[derive(Clone)]
pub struct AppState {
    schema: Arc<FeatureSchema>,
    model: Arc<TreeModel>,
}

impl AppState {
    /// Create application state from a loaded schema and model
    ///
    /// # Errors
    ///
    /// Returns `TasarError::Config` if the model's feature count does not
    /// match the schema; serving with a mismatched pair would fail every
    /// request.
    pub fn new(schema: FeatureSchema, model: TreeModel) -> Result<Self, TasarError> {
        if model.num_features() != schema.len() {
            return Err(TasarError::config(format!(
                "model was fitted on {} features but the schema declares {}",
                model.num_features(),
                schema.len()
            )));
        }
        Ok(Self {
            schema: Arc::new(schema),
            model: Arc::new(model),
        })
    }

    /// Create application state with the built-in demo schema and model
    ///
    /// # Errors
    ///
    /// Returns error if the demo artifacts fail their own validation.
    pub fn demo() -> Result<Self, TasarError> {
        let schema = FeatureSchema::from_json_str(
            r#"{"LotArea": "int", "YearBuilt": "int", "1stFlrSF": "int",
                "2ndFlrSF": "int", "FullBath": "int", "BedroomAbvGr": "int",
                "TotRmsAbvGrd": "int"}"#,
        )?;
        let model = TreeModel::demo()?;
        Self::new(schema, model)
    }

    /// The serving schema
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// The loaded model
    pub fn model(&self) -> &TreeModel {
        &self.model
    }
}

/// Hello response for the root endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloResponse {
    /// Always true
    pub success: bool,
    /// Greeting text
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Successful prediction response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Always true
    pub success: bool,
    /// One prediction per input record, in input order
    pub predictions: Vec<f64>,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Caller-facing error message
    pub error: String,
}

/// Create the API router
///
/// # Arguments
///
/// * `state` - Application state with schema and model
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .with_state(state)
}

/// Root handler
async fn hello_handler() -> Json<HelloResponse> {
    tracing::info!("main endpoint processing HTTP request");
    Json(HelloResponse {
        success: true,
        message: "Hello, World!".to_string(),
    })
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Prediction handler
///
/// Accepts a single JSON object or a JSON array of objects. The body is
/// parsed by hand rather than through the `Json` extractor so a parse
/// failure surfaces the exact `"Invalid JSON input format"` message.
async fn predict_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    tracing::info!("inference endpoint processing HTTP request");

    let parsed: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!("request body is not valid JSON: {e}");
        error_response(
            StatusCode::BAD_REQUEST,
            "Invalid JSON input format".to_string(),
        )
    })?;

    // Normalize: a single record becomes a one-element batch. An empty
    // array is accepted as zero records and yields zero predictions.
    let mut records: Vec<Value> = match parsed {
        Value::Array(items) => items,
        record @ Value::Object(_) => vec![record],
        _ => {
            tracing::error!("input data has the wrong top-level shape");
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Input data must be a list of records or a single record object.".to_string(),
            ));
        }
    };

    validate_presence(&records, state.schema()).map_err(reject)?;
    coerce_and_check(&mut records, state.schema()).map_err(reject)?;
    let table = FeatureTable::from_records(&records, state.schema()).map_err(reject)?;
    let predictions = state.model().predict(&table).map_err(reject)?;

    tracing::info!(count = predictions.len(), "predictions made successfully");
    Ok(Json(PredictResponse {
        success: true,
        predictions,
    }))
}

/// Map a pipeline error to its HTTP response
///
/// Model invocation failures are 500s; everything request-shaped is a 400.
fn reject(err: TasarError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        TasarError::Prediction { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    tracing::error!("request failed: {err}");
    error_response(status, err.to_string())
}

fn error_response(status: StatusCode, error: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error,
        }),
    )
}
