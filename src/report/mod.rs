//! Derived presentation values: loan analysis, risk level, car live metrics.
//!
//! Everything here is pure and never feeds back into the model input.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::domain::{LiveMetric, Profile, Tier};
use crate::encode::loan_percent_income;
use crate::form::car::CarLiveInputs;

/// Coarse affordability bucket from the loan-to-income ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.3 {
            RiskLevel::Low
        } else if ratio < 0.5 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn tier(self) -> Tier {
        match self {
            RiskLevel::Low => Tier::Good,
            RiskLevel::Medium => Tier::Fair,
            RiskLevel::High => Tier::Poor,
        }
    }
}

/// The figures shown above the loan predict button.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanAnalysis {
    pub loan_amount: f64,
    pub income: f64,
    pub ratio: f64,
    /// Only set when the profile shows it.
    pub risk: Option<RiskLevel>,
}

impl LoanAnalysis {
    pub fn new(loan_amount: f64, income: f64, profile: Profile) -> Self {
        let ratio = loan_percent_income(loan_amount, income);
        Self {
            loan_amount,
            income,
            ratio,
            risk: profile.shows_risk_level().then(|| RiskLevel::from_ratio(ratio)),
        }
    }
}

fn condition(age: f64) -> LiveMetric {
    let (value, tier) = if age < 3.0 {
        ("Excellent", Tier::Good)
    } else if age < 7.0 {
        ("Good", Tier::Fair)
    } else {
        ("Fair", Tier::Poor)
    };
    LiveMetric {
        title: "Condition",
        value,
        tier,
    }
}

fn usage(km_driven: f64) -> LiveMetric {
    let (value, tier) = if km_driven < 30_000.0 {
        ("Low", Tier::Good)
    } else if km_driven < 80_000.0 {
        ("Medium", Tier::Fair)
    } else {
        ("High", Tier::Poor)
    };
    LiveMetric {
        title: "Usage Level",
        value,
        tier,
    }
}

fn efficiency(mileage: f64) -> LiveMetric {
    let (value, tier) = if mileage > 18.0 {
        ("High", Tier::Good)
    } else if mileage > 12.0 {
        ("Medium", Tier::Fair)
    } else {
        ("Low", Tier::Poor)
    };
    LiveMetric {
        title: "Fuel Efficiency",
        value,
        tier,
    }
}

fn performance(max_power: f64) -> LiveMetric {
    let (value, tier) = if max_power > 150.0 {
        ("High", Tier::Good)
    } else if max_power > 100.0 {
        ("Medium", Tier::Fair)
    } else {
        ("Standard", Tier::Poor)
    };
    LiveMetric {
        title: "Performance",
        value,
        tier,
    }
}

/// Condition, usage, efficiency and performance, in display order.
pub fn car_live_metrics(inputs: &CarLiveInputs) -> [LiveMetric; 4] {
    [
        condition(inputs.age),
        usage(inputs.km_driven),
        efficiency(inputs.mileage),
        performance(inputs.max_power),
    ]
}
