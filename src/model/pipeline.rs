//! Column preprocessor + booster bundle.
//!
//! The car model is fit on raw strings, so its artifact carries the
//! preprocessing that turns a `FeatureVector` into the numeric row the trees
//! were trained on. Steps run in order; their outputs are concatenated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::encode::{FeatureValue, FeatureVector};
use crate::error::PredictError;
use crate::model::Model;
use crate::model::xgboost::{XgbBooster, check_schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStep {
    /// Copy a numeric column.
    Passthrough { column: String },
    /// Replace a label by its index in `categories`.
    ///
    /// Unlisted labels map to `unknown_value` when set, otherwise fail.
    Ordinal {
        column: String,
        categories: Vec<String>,
        #[serde(default)]
        unknown_value: Option<f64>,
    },
    /// One indicator column per category; unlisted labels produce all zeros.
    OneHot { column: String, categories: Vec<String> },
}

impl ColumnStep {
    pub fn column(&self) -> &str {
        match self {
            ColumnStep::Passthrough { column }
            | ColumnStep::Ordinal { column, .. }
            | ColumnStep::OneHot { column, .. } => column,
        }
    }

    /// Number of output columns.
    pub fn width(&self) -> usize {
        match self {
            ColumnStep::OneHot { categories, .. } => categories.len(),
            _ => 1,
        }
    }

    fn apply(&self, vector: &FeatureVector, out: &mut Vec<f64>) -> Result<(), PredictError> {
        let column = self.column();
        let value = vector
            .get(column)
            .ok_or_else(|| PredictError::invalid(format!("row has no column '{column}'")))?;

        match self {
            ColumnStep::Passthrough { .. } => match value {
                FeatureValue::Number(v) => out.push(*v),
                FeatureValue::Text(t) => {
                    let v = t.trim().parse::<f64>().map_err(|_| {
                        PredictError::invalid(format!("column '{column}' expects a number, got '{t}'"))
                    })?;
                    out.push(v);
                }
            },
            ColumnStep::Ordinal {
                categories,
                unknown_value,
                ..
            } => {
                let label = label_of(value);
                match categories.iter().position(|c| *c == label) {
                    Some(idx) => out.push(idx as f64),
                    None => match unknown_value {
                        Some(v) => out.push(*v),
                        None => return Err(PredictError::unknown_category(column, label)),
                    },
                }
            }
            ColumnStep::OneHot { categories, .. } => {
                let label = label_of(value);
                out.extend(categories.iter().map(|c| if *c == label { 1.0 } else { 0.0 }));
            }
        }
        Ok(())
    }
}

fn label_of(value: &FeatureValue) -> String {
    match value {
        FeatureValue::Text(t) => t.clone(),
        FeatureValue::Number(v) => v.to_string(),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct BundleJson {
    #[serde(default)]
    input_columns: Vec<String>,
    preprocessor: Vec<ColumnStep>,
    booster: Value,
}

/// A preprocessor in front of a booster.
#[derive(Debug, Clone)]
pub struct PipelineModel {
    input_columns: Vec<String>,
    steps: Vec<ColumnStep>,
    booster: XgbBooster,
}

impl PipelineModel {
    pub fn from_value(value: Value) -> Result<Self, PredictError> {
        let bundle: BundleJson = serde_json::from_value(value)
            .map_err(|e| PredictError::ModelUnavailable(format!("invalid pipeline bundle: {e}")))?;
        let booster = XgbBooster::from_value(bundle.booster)?;
        Self::new(bundle.input_columns, bundle.preprocessor, booster)
    }

    /// Assemble a pipeline, checking that the encoded width matches the booster.
    pub fn new(input_columns: Vec<String>, steps: Vec<ColumnStep>, booster: XgbBooster) -> Result<Self, PredictError> {
        if steps.is_empty() {
            return Err(PredictError::ModelUnavailable(
                "pipeline bundle has no preprocessing steps".to_string(),
            ));
        }
        let width: usize = steps.iter().map(ColumnStep::width).sum();
        if booster.num_feature() > 0 && width != booster.num_feature() {
            return Err(PredictError::ModelUnavailable(format!(
                "preprocessor produces {width} columns but booster expects {}",
                booster.num_feature()
            )));
        }
        Ok(Self {
            input_columns,
            steps,
            booster,
        })
    }

    pub fn transform(&self, vector: &FeatureVector) -> Result<Vec<f64>, PredictError> {
        if !self.input_columns.is_empty() {
            check_schema(&self.input_columns, &vector.names())?;
        }
        let mut row = Vec::with_capacity(self.encoded_width());
        for step in &self.steps {
            step.apply(vector, &mut row)?;
        }
        Ok(row)
    }

    pub fn encoded_width(&self) -> usize {
        self.steps.iter().map(ColumnStep::width).sum()
    }

    pub fn input_columns(&self) -> &[String] {
        &self.input_columns
    }

    pub fn steps(&self) -> &[ColumnStep] {
        &self.steps
    }

    pub fn booster(&self) -> &XgbBooster {
        &self.booster
    }
}

impl Model for PipelineModel {
    fn predict(&self, vector: &FeatureVector) -> Result<f64, PredictError> {
        let row = self.transform(vector)?;
        self.booster.predict_row(&row)
    }

    fn describe(&self) -> String {
        format!(
            "pipeline ({} steps, {} encoded columns) -> {}",
            self.steps.len(),
            self.encoded_width(),
            self.booster.describe()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::xgboost::tests::stump_model;
    use serde_json::json;

    fn vector() -> FeatureVector {
        FeatureVector::new(vec![
            ("fuel", FeatureValue::Text("Diesel".into())),
            ("age", FeatureValue::Number(4.0)),
        ])
    }

    #[test]
    fn steps_concatenate_in_order() {
        let steps = vec![
            ColumnStep::OneHot {
                column: "fuel".into(),
                categories: vec!["Petrol".into(), "Diesel".into()],
            },
            ColumnStep::Passthrough { column: "age".into() },
        ];
        let booster_json = stump_model("reg:squarederror", "0");
        let mut booster_json = booster_json;
        booster_json["learner"]["learner_model_param"]["num_feature"] = json!("3");
        let booster = XgbBooster::from_value(booster_json).unwrap();
        let p = PipelineModel::new(vec![], steps, booster).unwrap();
        assert_eq!(p.transform(&vector()).unwrap(), vec![0.0, 1.0, 4.0]);
        // First one-hot column is 0.0 (< 0.5) so the stump goes left.
        assert_eq!(p.predict(&vector()).unwrap(), -1.0);
    }

    #[test]
    fn ordinal_unknown_label_uses_fallback_or_fails() {
        let strict = ColumnStep::Ordinal {
            column: "fuel".into(),
            categories: vec!["Petrol".into()],
            unknown_value: None,
        };
        let mut out = Vec::new();
        assert_eq!(
            strict.apply(&vector(), &mut out).unwrap_err(),
            PredictError::unknown_category("fuel", "Diesel")
        );

        let lenient = ColumnStep::Ordinal {
            column: "fuel".into(),
            categories: vec!["Petrol".into()],
            unknown_value: Some(-1.0),
        };
        lenient.apply(&vector(), &mut out).unwrap();
        assert_eq!(out, vec![-1.0]);
    }

    #[test]
    fn width_mismatch_is_rejected_at_load() {
        let bundle = json!({
            "preprocessor": [{"kind": "passthrough", "column": "age"}],
            "booster": stump_model("reg:squarederror", "0"),
        });
        let err = PipelineModel::from_value(bundle).unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable(_)));
    }

    #[test]
    fn input_columns_enforce_order() {
        let bundle = json!({
            "input_columns": ["age", "fuel"],
            "preprocessor": [
                {"kind": "passthrough", "column": "age"},
                {"kind": "ordinal", "column": "fuel", "categories": ["Petrol", "Diesel"]}
            ],
            "booster": stump_model("reg:squarederror", "0"),
        });
        let p = PipelineModel::from_value(bundle).unwrap();
        let err = p.predict(&vector()).unwrap_err();
        assert!(err.to_string().contains("schema mismatch"));
    }
}
