//! Artifact loading and format detection.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::PredictError;
use crate::model::pipeline::{ColumnStep, PipelineModel};
use crate::model::xgboost::XgbBooster;
use crate::model::Model;

/// A parsed artifact, before it is erased to `dyn Model`.
#[derive(Debug, Clone)]
pub enum Artifact {
    Booster(XgbBooster),
    Pipeline(PipelineModel),
}

impl Artifact {
    /// Detect the format: a top-level `learner` key means a bare booster.
    pub fn from_value(value: Value) -> Result<Self, PredictError> {
        if value.get("learner").is_some() {
            Ok(Artifact::Booster(XgbBooster::from_value(value)?))
        } else if value.get("preprocessor").is_some() {
            Ok(Artifact::Pipeline(PipelineModel::from_value(value)?))
        } else {
            Err(PredictError::ModelUnavailable(
                "not an XGBoost model or pipeline bundle".to_string(),
            ))
        }
    }

    pub fn read(path: &Path) -> Result<Self, PredictError> {
        let text = fs::read_to_string(path).map_err(|e| {
            PredictError::ModelUnavailable(format!("cannot read '{}': {e}", path.display()))
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| {
            PredictError::ModelUnavailable(format!("'{}' is not valid JSON: {e}", path.display()))
        })?;
        Self::from_value(value)
    }

    pub fn summary(&self) -> ArtifactSummary {
        let (kind, booster, input_columns, steps) = match self {
            Artifact::Booster(b) => ("xgboost", b, b.feature_names().to_vec(), Vec::new()),
            Artifact::Pipeline(p) => (
                "pipeline",
                p.booster(),
                p.input_columns().to_vec(),
                p.steps().to_vec(),
            ),
        };
        ArtifactSummary {
            kind,
            objective: booster.objective_name().to_string(),
            num_trees: booster.num_trees(),
            num_feature: booster.num_feature(),
            input_columns,
            steps,
        }
    }

    pub fn into_model(self) -> Arc<dyn Model> {
        match self {
            Artifact::Booster(b) => Arc::new(b),
            Artifact::Pipeline(p) => Arc::new(p),
        }
    }
}

/// What `inspect` prints about an artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub kind: &'static str,
    pub objective: String,
    pub num_trees: usize,
    pub num_feature: usize,
    pub input_columns: Vec<String>,
    pub steps: Vec<ColumnStep>,
}

/// Load an artifact from disk as a shareable model.
pub fn load_artifact(path: &Path) -> Result<Arc<dyn Model>, PredictError> {
    let artifact = Artifact::read(path)?;
    log::info!("loaded {} from {}", artifact_kind(&artifact), path.display());
    Ok(artifact.into_model())
}

fn artifact_kind(artifact: &Artifact) -> String {
    match artifact {
        Artifact::Booster(b) => b.describe(),
        Artifact::Pipeline(p) => p.describe(),
    }
}
