//! Formatted terminal output.
//!
//! Formatting lives in one place so the CLI and TUI print identical numbers
//! and output changes stay localized.

use crate::domain::{CarPrediction, LiveMetric, LoanClass, LoanPrediction};
use crate::model::{ArtifactSummary, ColumnStep};
use crate::report::LoanAnalysis;

/// `1234567.4` -> `1,234,567`. Rounds to whole units.
pub fn fmt_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

pub fn fmt_money(currency: &str, value: f64) -> String {
    format!("{currency} {}", fmt_thousands(value))
}

/// A fraction as a percentage with one decimal (`0.2` -> `20.0%`).
pub fn fmt_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

pub fn format_loan_analysis(analysis: &LoanAnalysis, currency: &str) -> String {
    let mut out = String::new();
    out.push_str("Loan Analysis:\n");
    out.push_str(&format!("  Loan Amount          {}\n", fmt_money(currency, analysis.loan_amount)));
    out.push_str(&format!("  Annual Income        {}\n", fmt_money(currency, analysis.income)));
    out.push_str(&format!("  Loan-to-Income Ratio {}\n", fmt_percent(analysis.ratio)));
    if let Some(risk) = analysis.risk {
        out.push_str(&format!(
            "  Risk Level           {} {}\n",
            risk.tier().marker(),
            risk.display_name()
        ));
    }
    out
}

pub fn format_loan_result(prediction: &LoanPrediction) -> String {
    let mut out = String::new();
    let verdict = match prediction.predicted_class {
        LoanClass::Approved => "Low Default Risk Detected",
        LoanClass::NotApproved => "High Default Risk Detected",
    };
    out.push_str("Prediction Results:\n");
    out.push_str(&format!("  {}\n", prediction.predicted_class.display_name()));
    out.push_str(&format!("  {verdict}\n"));
    out.push_str(&format!("  Confidence: {}\n", fmt_percent(prediction.confidence())));
    out.push('\n');
    out.push_str("Risk Assessment Breakdown:\n");
    out.push_str(&format!(
        "  Approval Probability {}\n",
        fmt_percent(prediction.probability_approved)
    ));
    out.push_str(&format!(
        "  Default Risk         {}\n",
        fmt_percent(prediction.probability_default)
    ));
    out
}

pub fn format_live_metrics(metrics: &[LiveMetric]) -> String {
    let mut out = String::from("Vehicle Analysis:\n");
    for m in metrics {
        out.push_str(&format!("  {:<16} {} {}\n", m.title, m.tier.marker(), m.value));
    }
    out
}

pub fn format_car_result(prediction: &CarPrediction, age: f64, currency: &str) -> String {
    let (lo, hi) = prediction.price_range();
    let mut out = String::new();
    out.push_str("Predicted Price:\n");
    out.push_str(&format!("  {}\n", fmt_money(currency, prediction.predicted_price)));
    out.push('\n');
    out.push_str("Price Analysis:\n");
    out.push_str(&format!(
        "  Estimated Range {} - {}\n",
        fmt_money(currency, lo),
        fmt_money(currency, hi)
    ));
    out.push_str(&format!(
        "  Value per Year  {}\n",
        fmt_money(currency, prediction.value_per_year(age))
    ));
    out
}

pub fn format_artifact_summary(summary: &ArtifactSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Kind:      {}\n", summary.kind));
    out.push_str(&format!("Objective: {}\n", summary.objective));
    out.push_str(&format!("Trees:     {}\n", summary.num_trees));
    out.push_str(&format!("Features:  {}\n", summary.num_feature));
    if summary.input_columns.is_empty() {
        out.push_str("Columns:   (not recorded)\n");
    } else {
        out.push_str(&format!("Columns:   {}\n", summary.input_columns.join(", ")));
    }
    if !summary.steps.is_empty() {
        out.push_str("\nPreprocessor:\n");
        for step in &summary.steps {
            let detail = match step {
                ColumnStep::Passthrough { .. } => "passthrough".to_string(),
                ColumnStep::Ordinal {
                    categories,
                    unknown_value,
                    ..
                } => match unknown_value {
                    Some(v) => format!("ordinal ({} categories, unknown -> {v})", categories.len()),
                    None => format!("ordinal ({} categories)", categories.len()),
                },
                ColumnStep::OneHot { categories, .. } => format!("one-hot ({} columns)", categories.len()),
            };
            out.push_str(&format!("  {:<14} {detail}\n", truncate(step.column(), 14)));
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Profile;

    #[test]
    fn thousands_separators() {
        assert_eq!(fmt_thousands(0.0), "0");
        assert_eq!(fmt_thousands(999.4), "999");
        assert_eq!(fmt_thousands(1000.0), "1,000");
        assert_eq!(fmt_thousands(1_234_567.6), "1,234,568");
        assert_eq!(fmt_thousands(-45_000.0), "-45,000");
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(fmt_percent(0.2), "20.0%");
        assert_eq!(fmt_percent(0.8808), "88.1%");
    }

    #[test]
    fn loan_analysis_lists_risk_only_when_set() {
        let classic = format_loan_analysis(&LoanAnalysis::new(10_000.0, 50_000.0, Profile::Classic), "Rs.");
        assert!(classic.contains("Rs. 10,000"));
        assert!(classic.contains("Rs. 50,000"));
        assert!(classic.contains("20.0%"));
        assert!(!classic.contains("Risk Level"));

        let extended = format_loan_analysis(&LoanAnalysis::new(10_000.0, 50_000.0, Profile::Extended), "Rs.");
        assert!(extended.contains("Risk Level"));
    }

    #[test]
    fn loan_result_uses_predicted_class_confidence() {
        let p = LoanPrediction {
            predicted_class: LoanClass::NotApproved,
            probability_approved: 0.25,
            probability_default: 0.75,
        };
        let text = format_loan_result(&p);
        assert!(text.contains("LOAN NOT APPROVED"));
        assert!(text.contains("Confidence: 75.0%"));
    }

    #[test]
    fn car_result_shows_band_and_value_per_year() {
        let p = CarPrediction {
            predicted_price: 500_000.0,
        };
        let text = format_car_result(&p, 0.0, "Rs.");
        assert!(text.contains("Rs. 500,000"));
        assert!(text.contains("Rs. 450,000 - Rs. 550,000"));
        // Age below one counts as one year.
        assert!(text.contains("Value per Year  Rs. 500,000"));
    }
}
