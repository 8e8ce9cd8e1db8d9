//! Error types.
//!
//! - `PredictError`: what the collector/encoder/adapter layers return
//! - `AppError`: what the binary reports (message + process exit code)

use std::fmt;

/// Exit code for bad input, configuration or file IO.
pub const EXIT_INPUT: u8 = 2;
/// Exit code when the model artifact could not be loaded.
pub const EXIT_MODEL: u8 = 3;
/// Exit code for terminal/runtime failures.
pub const EXIT_RUNTIME: u8 = 4;

/// Failure kinds of a single prediction request.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictError {
    /// The model artifact is missing or corrupt. Terminal for the adapter.
    ModelUnavailable(String),
    /// A field could not be parsed or is out of range. The user can fix it and retry.
    InvalidInput(String),
    /// A categorical label has no code in its mapping table.
    UnknownCategory { field: String, label: String },
    /// The model produced malformed output (e.g. a non-finite value).
    Inference(String),
}

impl PredictError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unknown_category(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::UnknownCategory {
            field: field.into(),
            label: label.into(),
        }
    }
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictError::ModelUnavailable(reason) => write!(f, "Model not available: {reason}"),
            PredictError::InvalidInput(message) => write!(f, "Invalid input: {message}"),
            PredictError::UnknownCategory { field, label } => {
                write!(f, "Unknown category '{label}' for field '{field}'")
            }
            PredictError::Inference(message) => write!(f, "Prediction failed: {message}"),
        }
    }
}

impl std::error::Error for PredictError {}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        let code = match err {
            PredictError::ModelUnavailable(_) => EXIT_MODEL,
            PredictError::Inference(_) => EXIT_RUNTIME,
            PredictError::InvalidInput(_) | PredictError::UnknownCategory { .. } => EXIT_INPUT,
        };
        AppError::new(code, err.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_error_maps_to_exit_codes() {
        let unavailable: AppError = PredictError::ModelUnavailable("missing".into()).into();
        assert_eq!(unavailable.exit_code(), EXIT_MODEL);

        let invalid: AppError = PredictError::invalid("age out of range").into();
        assert_eq!(invalid.exit_code(), EXIT_INPUT);
        assert_eq!(invalid.to_string(), "Invalid input: age out of range");

        let unknown: AppError = PredictError::unknown_category("loan_intent", "Travel").into();
        assert_eq!(unknown.exit_code(), EXIT_INPUT);
        assert!(unknown.to_string().contains("Travel"));
    }
}
