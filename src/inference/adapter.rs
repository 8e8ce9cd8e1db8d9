//! Lazy, load-once owner of a model artifact.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::error::PredictError;
use crate::model::{Model, load_artifact};

type Loader = Box<dyn Fn() -> Result<Arc<dyn Model>, PredictError> + Send + Sync>;

/// Where an adapter is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterState {
    Unloaded,
    Loaded,
    /// Terminal: the reason is returned on every later call.
    Failed(String),
}

/// Owns one model artifact: loaded on first use, then shared read-only.
///
/// A failed load is remembered; the loader is never called twice.
pub struct InferenceAdapter {
    source: String,
    loader: Loader,
    slot: OnceLock<Result<Arc<dyn Model>, String>>,
}

impl InferenceAdapter {
    /// Load from `path` on first use.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path: PathBuf = path.as_ref().to_path_buf();
        let source = path.display().to_string();
        Self::with_loader(source, move || load_artifact(&path))
    }

    /// An already-loaded model.
    pub fn with_model(model: Arc<dyn Model>) -> Self {
        let adapter = Self::with_loader("<in-memory>", || {
            Err(PredictError::ModelUnavailable("no loader".to_string()))
        });
        let _ = adapter.slot.set(Ok(model));
        adapter
    }

    pub fn with_loader<F>(source: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Model>, PredictError> + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            loader: Box::new(loader),
            slot: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn state(&self) -> AdapterState {
        match self.slot.get() {
            None => AdapterState::Unloaded,
            Some(Ok(_)) => AdapterState::Loaded,
            Some(Err(reason)) => AdapterState::Failed(reason.clone()),
        }
    }

    /// The loaded model, loading it if this is the first call.
    pub fn model(&self) -> Result<Arc<dyn Model>, PredictError> {
        let slot = self.slot.get_or_init(|| match (self.loader)() {
            Ok(model) => {
                log::info!("model ready: {} ({})", self.source, model.describe());
                Ok(model)
            }
            Err(err) => {
                log::warn!("model load failed for {}: {err}", self.source);
                Err(match err {
                    PredictError::ModelUnavailable(reason) => reason,
                    other => other.to_string(),
                })
            }
        });
        match slot {
            Ok(model) => Ok(Arc::clone(model)),
            Err(reason) => Err(PredictError::ModelUnavailable(reason.clone())),
        }
    }

    /// Raw model output for one row.
    pub fn predict_raw(&self, vector: &crate::encode::FeatureVector) -> Result<f64, PredictError> {
        self.model()?.predict(vector)
    }
}

impl fmt::Debug for InferenceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceAdapter")
            .field("source", &self.source)
            .field("state", &self.state())
            .finish()
    }
}
