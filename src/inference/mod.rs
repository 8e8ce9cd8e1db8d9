//! Inference adapter and the two task-specific prediction calls.
//!
//! - loan: the model yields P(approved); approved iff P > 0.5
//! - car: the model yields log-price; price = exp(raw)
//!
//! Errors surface at the call boundary. No retries, no partial results.

pub mod adapter;

pub use adapter::{AdapterState, InferenceAdapter};

use crate::domain::{CarPrediction, LoanClass, LoanPrediction};
use crate::encode::FeatureVector;
use crate::error::PredictError;

/// Decision threshold on P(approved). Approval requires strictly more than this.
pub const APPROVAL_THRESHOLD: f64 = 0.5;

pub fn predict_loan(adapter: &InferenceAdapter, vector: &FeatureVector) -> Result<LoanPrediction, PredictError> {
    let p = adapter.predict_raw(vector)?;
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(PredictError::Inference(format!(
            "classifier returned {p}, expected a probability"
        )));
    }
    let label = u8::from(p > APPROVAL_THRESHOLD);
    log::debug!("loan P(approved)={p:.4}");
    Ok(LoanPrediction {
        predicted_class: LoanClass::from_label(label),
        probability_approved: p,
        probability_default: 1.0 - p,
    })
}

pub fn predict_car(adapter: &InferenceAdapter, vector: &FeatureVector) -> Result<CarPrediction, PredictError> {
    let raw = adapter.predict_raw(vector)?;
    let price = raw.exp();
    if !price.is_finite() {
        return Err(PredictError::Inference(format!(
            "log-price {raw} does not map to a finite price"
        )));
    }
    log::debug!("car log-price={raw:.4} price={price:.2}");
    Ok(CarPrediction { predicted_price: price })
}
