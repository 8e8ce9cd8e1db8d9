//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - rendered in the CLI and the TUI
//! - exported to JSON/CSV
//! - compared in tests without a model on disk

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which of the two tools a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Loan,
    Car,
}

impl Tool {
    pub fn display_name(self) -> &'static str {
        match self {
            Tool::Loan => "Loan Approval",
            Tool::Car => "Car Price",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tool::Loan => Tool::Car,
            Tool::Car => Tool::Loan,
        }
    }
}

/// Presentation profile.
///
/// Both profiles share one encoding/inference contract; they only differ in
/// which derived metrics are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Loan analysis without the risk-level metric, car result without live metrics.
    Classic,
    /// Adds the loan risk level and the car live metrics panel.
    Extended,
}

impl Profile {
    pub fn shows_risk_level(self) -> bool {
        matches!(self, Profile::Extended)
    }

    pub fn shows_live_metrics(self) -> bool {
        matches!(self, Profile::Extended)
    }
}

/// Loan classifier output label.
///
/// The model's positive class (`1`) is an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanClass {
    Approved,
    NotApproved,
}

impl LoanClass {
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            LoanClass::Approved
        } else {
            LoanClass::NotApproved
        }
    }

    pub fn label(self) -> u8 {
        match self {
            LoanClass::Approved => 1,
            LoanClass::NotApproved => 0,
        }
    }

    /// Machine-readable name, the same string serde writes.
    pub fn as_str(self) -> &'static str {
        match self {
            LoanClass::Approved => "approved",
            LoanClass::NotApproved => "not_approved",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LoanClass::Approved => "LOAN APPROVED",
            LoanClass::NotApproved => "LOAN NOT APPROVED",
        }
    }
}

/// Classification result for one loan application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanPrediction {
    pub predicted_class: LoanClass,
    pub probability_approved: f64,
    pub probability_default: f64,
}

impl LoanPrediction {
    /// Probability mass of the predicted class.
    pub fn confidence(&self) -> f64 {
        match self.predicted_class {
            LoanClass::Approved => self.probability_approved,
            LoanClass::NotApproved => self.probability_default,
        }
    }
}

/// Regression result for one car listing (currency units, not log-space).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarPrediction {
    pub predicted_price: f64,
}

impl CarPrediction {
    /// `[price * 0.9, price * 1.1]` display band.
    pub fn price_range(&self) -> (f64, f64) {
        (self.predicted_price * 0.9, self.predicted_price * 1.1)
    }

    /// Price per year of age; ages below one year count as one.
    pub fn value_per_year(&self, age: f64) -> f64 {
        self.predicted_price / age.max(1.0)
    }
}

/// Either kind of result, tagged by task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "lowercase")]
pub enum PredictionResult {
    Classification(LoanPrediction),
    Regression(CarPrediction),
}

/// Three-level qualitative rating used by the live metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Good,
    Fair,
    Poor,
}

impl Tier {
    pub fn marker(self) -> &'static str {
        match self {
            Tier::Good => "[+]",
            Tier::Fair => "[~]",
            Tier::Poor => "[-]",
        }
    }
}

/// A labeled qualitative metric (e.g. "Condition: Excellent").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveMetric {
    pub title: &'static str,
    pub value: &'static str,
    pub tier: Tier,
}
