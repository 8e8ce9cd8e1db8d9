//! Serialized model artifacts and their inference.
//!
//! - `xgboost`: gradient-boosted tree ensembles saved with `save_model("*.json")`
//! - `pipeline`: a column preprocessor in front of a booster (raw-string rows)
//! - `artifact`: format detection and loading from disk
//!
//! Everything here is read-only after load and safe to share across threads.

pub mod artifact;
pub mod pipeline;
pub mod xgboost;

pub use artifact::{Artifact, ArtifactSummary, load_artifact};
pub use pipeline::{ColumnStep, PipelineModel};
pub use xgboost::{Objective, XgbBooster};

use crate::encode::FeatureVector;
use crate::error::PredictError;

/// A loaded model: one feature row in, one raw output value out.
///
/// For classifiers the output is P(positive class); for regressors it is the
/// model's target scale (log-price for the car model).
pub trait Model: Send + Sync {
    fn predict(&self, vector: &FeatureVector) -> Result<f64, PredictError>;

    /// One-line human-readable description.
    fn describe(&self) -> String {
        "model".to_string()
    }
}
