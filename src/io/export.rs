//! Export a single prediction to JSON.
//!
//! The record is self-describing: the validated inputs, the exact feature row
//! the model saw, and the result.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{PredictionResult, Tool};
use crate::encode::FeatureVector;
use crate::error::{AppError, EXIT_INPUT};

/// What `--export` writes.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    pub tool: Tool,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub inputs: Value,
    pub features: FeatureVector,
    pub result: PredictionResult,
}

impl PredictionRecord {
    pub fn new<I: Serialize>(
        tool: Tool,
        model: impl Into<String>,
        inputs: &I,
        features: FeatureVector,
        result: PredictionResult,
    ) -> Result<Self, AppError> {
        let inputs = serde_json::to_value(inputs)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to serialize inputs: {e}")))?;
        Ok(Self {
            tool,
            generated_at: Utc::now(),
            model: model.into(),
            inputs,
            features,
            result,
        })
    }
}

pub fn write_prediction_json(path: &Path, record: &PredictionRecord) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create export JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, record)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export JSON: {e}")))?;
    log::info!("wrote prediction to {}", path.display());
    Ok(())
}
