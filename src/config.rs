//! Runtime configuration from the environment (`.env` is loaded if present).
//!
//! | variable          | default                  |
//! |-------------------|--------------------------|
//! | `LOAN_MODEL_PATH` | `xgboost_model.json`     |
//! | `CAR_MODEL_PATH`  | `xgboost_pipeline.json`  |
//! | `PREDICT_CURRENCY`| `Rs.`                    |
//! | `PREDICT_PROFILE` | `classic`                |

use std::path::PathBuf;

use crate::domain::{Profile, Tool};
use crate::error::{AppError, EXIT_INPUT};

pub const DEFAULT_LOAN_MODEL: &str = "xgboost_model.json";
pub const DEFAULT_CAR_MODEL: &str = "xgboost_pipeline.json";
pub const DEFAULT_CURRENCY: &str = "Rs.";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub loan_model: PathBuf,
    pub car_model: PathBuf,
    pub currency: String,
    pub profile: Profile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            loan_model: PathBuf::from(DEFAULT_LOAN_MODEL),
            car_model: PathBuf::from(DEFAULT_CAR_MODEL),
            currency: DEFAULT_CURRENCY.to_string(),
            profile: Profile::Classic,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let profile = match get("PREDICT_PROFILE") {
            None => defaults.profile,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "classic" => Profile::Classic,
                "extended" => Profile::Extended,
                _ => {
                    return Err(AppError::new(
                        EXIT_INPUT,
                        format!("Invalid PREDICT_PROFILE '{raw}' (expected classic or extended)."),
                    ));
                }
            },
        };

        Ok(Self {
            loan_model: get("LOAN_MODEL_PATH").map(PathBuf::from).unwrap_or(defaults.loan_model),
            car_model: get("CAR_MODEL_PATH").map(PathBuf::from).unwrap_or(defaults.car_model),
            currency: get("PREDICT_CURRENCY").unwrap_or(defaults.currency),
            profile,
        })
    }

    /// Replace the currency prefix; a blank prefix is rejected.
    pub fn with_currency(mut self, currency: &str) -> Result<Self, AppError> {
        let currency = currency.trim();
        if currency.is_empty() {
            return Err(AppError::new(EXIT_INPUT, "Currency prefix must not be empty."));
        }
        self.currency = currency.to_string();
        Ok(self)
    }

    pub fn model_path(&self, tool: Tool) -> &PathBuf {
        match tool {
            Tool::Loan => &self.loan_model,
            Tool::Car => &self.car_model,
        }
    }
}
