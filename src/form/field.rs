//! Form field definitions and the two numeric parsing tiers.
//!
//! - `parse_lenient`: live/derived display only, never fails (falls back to 0)
//! - `NumericField::parse_strict`: the predict path, surfaces `InvalidInput`

use crate::error::PredictError;

/// A numeric input with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericField {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f64,
    /// `None` means unbounded above.
    pub max: Option<f64>,
    pub default: f64,
    /// Increment used by the TUI's left/right adjustment.
    pub step: f64,
    /// Reject values with a fractional part.
    pub integer: bool,
}

impl NumericField {
    /// Check bounds and integrality of an already-parsed value.
    pub fn validate(&self, value: f64) -> Result<f64, PredictError> {
        if !value.is_finite() {
            return Err(PredictError::invalid(format!("{} must be a finite number", self.label)));
        }
        if self.integer && value.fract() != 0.0 {
            return Err(PredictError::invalid(format!(
                "{} must be a whole number (got {value})",
                self.label
            )));
        }
        if value < self.min {
            return Err(PredictError::invalid(format!(
                "{} must be at least {} (got {value})",
                self.label,
                fmt_bound(self.min)
            )));
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(PredictError::invalid(format!(
                    "{} must be at most {} (got {value})",
                    self.label,
                    fmt_bound(max)
                )));
            }
        }
        Ok(value)
    }

    /// Strict parser for the predict path.
    pub fn parse_strict(&self, text: &str) -> Result<f64, PredictError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PredictError::invalid(format!("{} is required", self.label)));
        }
        let value = trimmed.parse::<f64>().map_err(|_| {
            PredictError::invalid(format!("{} must be a number (got '{trimmed}')", self.label))
        })?;
        self.validate(value)
    }

    /// Clamp into the declared range (used when stepping with arrow keys).
    pub fn clamp(&self, value: f64) -> f64 {
        let lower = value.max(self.min);
        match self.max {
            Some(max) => lower.min(max),
            None => lower,
        }
    }

    pub fn format_value(&self, value: f64) -> String {
        if self.integer {
            format!("{value:.0}")
        } else {
            format!("{value:.1}")
        }
    }
}

/// A categorical input restricted to an enumerated label set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChoiceField {
    pub key: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
}

impl ChoiceField {
    /// Resolve a user-supplied label to the canonical option.
    pub fn validate(&self, label: &str) -> Result<&'static str, PredictError> {
        let trimmed = label.trim();
        self.options
            .iter()
            .find(|opt| opt.eq_ignore_ascii_case(trimmed))
            .copied()
            .ok_or_else(|| {
                PredictError::invalid(format!(
                    "{} must be one of: {} (got '{trimmed}')",
                    self.label,
                    self.options.join(", ")
                ))
            })
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.options.iter().position(|opt| opt.eq_ignore_ascii_case(label.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Numeric(NumericField),
    Choice(ChoiceField),
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Field::Numeric(f) => f.key,
            Field::Choice(f) => f.key,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Numeric(f) => f.label,
            Field::Choice(f) => f.label,
        }
    }

    /// Text a fresh form starts with.
    pub fn default_text(&self) -> String {
        match self {
            Field::Numeric(f) => f.format_value(f.default),
            Field::Choice(f) => f.options.first().copied().unwrap_or_default().to_string(),
        }
    }
}

/// Lenient parser for live metrics: empty or non-numeric text reads as 0.
pub fn parse_lenient(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn fmt_bound(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGE: NumericField = NumericField {
        key: "person_age",
        label: "Age",
        min: 18.0,
        max: Some(100.0),
        default: 30.0,
        step: 1.0,
        integer: true,
    };

    const RATE: NumericField = NumericField {
        key: "loan_int_rate",
        label: "Interest Rate (%)",
        min: 1.0,
        max: Some(50.0),
        default: 12.5,
        step: 0.1,
        integer: false,
    };

    #[test]
    fn strict_parser_enforces_inclusive_bounds() {
        assert_eq!(AGE.parse_strict("18").unwrap(), 18.0);
        assert_eq!(AGE.parse_strict("100").unwrap(), 100.0);
        assert!(matches!(AGE.parse_strict("17"), Err(PredictError::InvalidInput(_))));
        assert!(matches!(AGE.parse_strict("101"), Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn strict_parser_rejects_garbage_and_fractions() {
        assert!(AGE.parse_strict("").is_err());
        assert!(AGE.parse_strict("abc").is_err());
        assert!(AGE.parse_strict("30.5").is_err());
        assert!(AGE.parse_strict("NaN").is_err());
        assert_eq!(RATE.parse_strict(" 12.5 ").unwrap(), 12.5);
    }

    #[test]
    fn lenient_parser_falls_back_to_zero() {
        assert_eq!(parse_lenient(""), 0.0);
        assert_eq!(parse_lenient("12k"), 0.0);
        assert_eq!(parse_lenient("inf"), 0.0);
        assert_eq!(parse_lenient(" 42.5 "), 42.5);
    }

    #[test]
    fn choice_validation_is_case_insensitive_but_canonical() {
        let field = ChoiceField {
            key: "fuel",
            label: "Fuel Type",
            options: &["Petrol", "Diesel"],
        };
        assert_eq!(field.validate("diesel").unwrap(), "Diesel");
        assert!(field.validate("Electric").is_err());
    }

    #[test]
    fn clamp_respects_open_upper_bound() {
        let income = NumericField {
            max: None,
            min: 1000.0,
            ..AGE
        };
        assert_eq!(income.clamp(10.0), 1000.0);
        assert_eq!(income.clamp(1e9), 1e9);
        assert_eq!(AGE.clamp(250.0), 100.0);
    }
}
