//! Shared request logic used by the CLI, batch and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! form -> validated application -> feature row -> inference -> derived metrics
//!
//! The front-ends can then focus on presentation (printing vs widgets).

use rayon::prelude::*;

use crate::domain::{CarPrediction, LiveMetric, LoanPrediction, PredictionResult, Profile, Tool};
use crate::encode::{FeatureVector, encode_car, encode_loan};
use crate::error::{AppError, PredictError};
use crate::form::car::CarLiveInputs;
use crate::form::{CarListing, FormState, LoanApplication};
use crate::inference::{InferenceAdapter, predict_car, predict_loan};
use crate::io::batch::{BatchInput, BatchOutcome};
use crate::report::{LoanAnalysis, car_live_metrics};

/// All computed outputs of one loan prediction.
#[derive(Debug, Clone)]
pub struct LoanRun {
    pub application: LoanApplication,
    pub vector: FeatureVector,
    pub analysis: LoanAnalysis,
    pub prediction: LoanPrediction,
}

/// All computed outputs of one car prediction.
#[derive(Debug, Clone)]
pub struct CarRun {
    pub listing: CarListing,
    pub vector: FeatureVector,
    pub prediction: CarPrediction,
    /// Set when the profile shows live metrics.
    pub metrics: Option<[LiveMetric; 4]>,
}

/// Copy raw `(key, text)` pairs into a form.
pub fn apply_values(form: &mut FormState, values: &[(&str, &str)]) -> Result<(), PredictError> {
    for (key, value) in values {
        form.set(key, *value)?;
    }
    Ok(())
}

pub fn run_loan(form: &FormState, adapter: &InferenceAdapter, profile: Profile) -> Result<LoanRun, PredictError> {
    let application = LoanApplication::collect(form)?;
    let vector = encode_loan(&application)?;
    let prediction = predict_loan(adapter, &vector)?;
    let analysis = LoanAnalysis::new(application.loan_amount as f64, application.income as f64, profile);
    Ok(LoanRun {
        application,
        vector,
        analysis,
        prediction,
    })
}

pub fn run_car(form: &FormState, adapter: &InferenceAdapter, profile: Profile) -> Result<CarRun, PredictError> {
    let listing = CarListing::collect(form)?;
    let vector = encode_car(&listing);
    let prediction = predict_car(adapter, &vector)?;
    let metrics = profile
        .shows_live_metrics()
        .then(|| car_live_metrics(&CarLiveInputs::from_form(form)));
    Ok(CarRun {
        listing,
        vector,
        prediction,
        metrics,
    })
}

/// Score one filled form without presentation extras.
pub fn score_form(tool: Tool, form: &FormState, adapter: &InferenceAdapter) -> Result<PredictionResult, PredictError> {
    match tool {
        Tool::Loan => run_loan(form, adapter, Profile::Classic).map(|r| PredictionResult::Classification(r.prediction)),
        Tool::Car => run_car(form, adapter, Profile::Classic).map(|r| PredictionResult::Regression(r.prediction)),
    }
}

/// Score every row in parallel against one shared model.
///
/// The model is loaded once up front; if that fails the whole batch fails.
/// Row-level failures become outcomes and never abort the batch.
pub fn run_batch(tool: Tool, input: &BatchInput, adapter: &InferenceAdapter) -> Result<Vec<BatchOutcome>, AppError> {
    adapter.model()?;

    let mut outcomes: Vec<BatchOutcome> = input
        .rows
        .par_iter()
        .map(|row| {
            let result = score_form(tool, &row.form, adapter).map_err(|e| {
                log::warn!("line {}: {e}", row.line);
                e.to_string()
            });
            BatchOutcome {
                line: row.line,
                result,
            }
        })
        .collect();

    outcomes.extend(input.row_errors.iter().map(|e| BatchOutcome {
        line: e.line,
        result: Err(e.message.clone()),
    }));
    outcomes.sort_by_key(|o| o.line);

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    log::info!(
        "scored {} {} rows ({} failed)",
        outcomes.len(),
        tool.display_name(),
        failed
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoanClass;
    use crate::error::EXIT_MODEL;
    use crate::form::{CAR_FIELDS, LOAN_FIELDS};
    use crate::io::batch::read_batch;
    use crate::model::Model;
    use std::sync::Arc;

    struct Constant(f64);

    impl Model for Constant {
        fn predict(&self, _vector: &FeatureVector) -> Result<f64, PredictError> {
            Ok(self.0)
        }
    }

    fn stub(value: f64) -> InferenceAdapter {
        InferenceAdapter::with_model(Arc::new(Constant(value)))
    }

    #[test]
    fn loan_run_carries_analysis_and_prediction() {
        let mut form = FormState::new(&LOAN_FIELDS);
        apply_values(&mut form, &[("loan_amnt", "30000"), ("person_income", "50000")]).unwrap();
        let run = run_loan(&form, &stub(0.9), Profile::Extended).unwrap();
        assert_eq!(run.prediction.predicted_class, LoanClass::Approved);
        assert_eq!(run.analysis.ratio, 0.6);
        assert_eq!(run.vector.number("loan_percent_income"), Some(0.6));
        assert!(run.analysis.risk.is_some());
    }

    #[test]
    fn invalid_form_never_reaches_the_model() {
        let mut form = FormState::new(&LOAN_FIELDS);
        apply_values(&mut form, &[("person_age", "101")]).unwrap();
        let adapter = InferenceAdapter::from_path(std::env::temp_dir().join("tabular-predict-never-loaded.json"));
        let err = run_loan(&form, &adapter, Profile::Classic).unwrap_err();
        assert!(matches!(err, PredictError::InvalidInput(_)));
        assert_eq!(adapter.state(), crate::inference::AdapterState::Unloaded);
    }

    #[test]
    fn car_metrics_follow_profile() {
        let form = FormState::new(&CAR_FIELDS);
        let classic = run_car(&form, &stub(12.0), Profile::Classic).unwrap();
        assert!(classic.metrics.is_none());
        let extended = run_car(&form, &stub(12.0), Profile::Extended).unwrap();
        assert_eq!(extended.metrics.unwrap()[0].value, "Good");
    }

    #[test]
    fn batch_reports_bad_rows_without_aborting() {
        let csv = "name,fuel,transmission,owner,engine,max_power,mileage,seats,km_driven,age,seller_type\n\
            Honda,Petrol,Manual,First Owner,1200,90,18.5,5,40000,4,Dealer\n\
            Honda,Petrol,Manual,First Owner,,90,18.5,5,40000,4,Dealer\n\
            Tesla,Electric,Manual,First Owner,1200,90,18.5,5,40000,4,Dealer\n";
        let input = read_batch(csv.as_bytes(), Tool::Car).unwrap();
        let outcomes = run_batch(Tool::Car, &input, &stub(11.0)).unwrap();
        assert_eq!(outcomes.iter().map(|o| o.line).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert!(outcomes[2].result.is_err());
    }

    #[test]
    fn batch_fails_fast_without_a_model() {
        let input = read_batch("person_age\n".as_bytes(), Tool::Car);
        assert!(input.is_err());

        let empty = BatchInput {
            rows: Vec::new(),
            row_errors: Vec::new(),
            rows_read: 0,
        };
        let adapter = InferenceAdapter::from_path(std::env::temp_dir().join("tabular-predict-no-batch-model.json"));
        let err = run_batch(Tool::Loan, &empty, &adapter).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_MODEL);
    }
}
