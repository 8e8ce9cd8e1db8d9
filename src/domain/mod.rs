//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - request selectors (`Tool`, `Profile`)
//! - prediction outputs (`LoanPrediction`, `CarPrediction`, `PredictionResult`)
//! - qualitative metrics shown next to the form (`LiveMetric`, `Tier`)

pub mod types;

pub use types::*;
