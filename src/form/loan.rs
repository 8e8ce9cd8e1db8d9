//! Loan application form.

use serde::{Deserialize, Serialize};

use crate::error::PredictError;
use crate::form::{ChoiceField, Field, FormState, NumericField};

pub const GENDERS: &[&str] = &["Female", "Male"];
pub const EDUCATION_LEVELS: &[&str] = &["Associate", "Bachelor", "Doctorate", "High School", "Master"];
pub const HOME_OWNERSHIP: &[&str] = &["Mortgage", "Other", "Own", "Rent"];
pub const LOAN_INTENTS: &[&str] = &[
    "Debt Consolidation",
    "Education",
    "Home Improvement",
    "Medical",
    "Personal",
    "Venture",
];
pub const PRIOR_DEFAULTS: &[&str] = &["No", "Yes"];

/// Form fields in on-screen order (personal, financial, loan).
///
/// This is presentation order; the model's feature order lives in `encode`.
pub static LOAN_FIELDS: [Field; 12] = [
    Field::Numeric(NumericField {
        key: "person_age",
        label: "Age",
        min: 18.0,
        max: Some(100.0),
        default: 30.0,
        step: 1.0,
        integer: true,
    }),
    Field::Choice(ChoiceField {
        key: "person_gender",
        label: "Gender",
        options: GENDERS,
    }),
    Field::Choice(ChoiceField {
        key: "person_education",
        label: "Education Level",
        options: EDUCATION_LEVELS,
    }),
    Field::Numeric(NumericField {
        key: "person_emp_exp",
        label: "Employment Experience (yrs)",
        min: 0.0,
        max: Some(50.0),
        default: 5.0,
        step: 1.0,
        integer: true,
    }),
    Field::Numeric(NumericField {
        key: "person_income",
        label: "Income",
        min: 1000.0,
        max: None,
        default: 50000.0,
        step: 1000.0,
        integer: true,
    }),
    Field::Choice(ChoiceField {
        key: "person_home_ownership",
        label: "Home Ownership",
        options: HOME_OWNERSHIP,
    }),
    Field::Numeric(NumericField {
        key: "credit_score",
        label: "Credit Score",
        min: 300.0,
        max: Some(850.0),
        default: 700.0,
        step: 1.0,
        integer: true,
    }),
    Field::Numeric(NumericField {
        key: "cb_person_cred_hist_length",
        label: "Credit History Length (yrs)",
        min: 0.0,
        max: Some(50.0),
        default: 10.0,
        step: 1.0,
        integer: true,
    }),
    Field::Numeric(NumericField {
        key: "loan_amnt",
        label: "Loan Amount",
        min: 500.0,
        max: None,
        default: 10000.0,
        step: 500.0,
        integer: true,
    }),
    Field::Choice(ChoiceField {
        key: "loan_intent",
        label: "Loan Purpose",
        options: LOAN_INTENTS,
    }),
    Field::Numeric(NumericField {
        key: "loan_int_rate",
        label: "Interest Rate (%)",
        min: 1.0,
        max: Some(50.0),
        default: 12.5,
        step: 0.1,
        integer: false,
    }),
    Field::Choice(ChoiceField {
        key: "previous_loan_defaults_on_file",
        label: "Previous Defaults",
        options: PRIOR_DEFAULTS,
    }),
];

/// A validated loan application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub age: u32,
    pub gender: String,
    pub education: String,
    pub income: u64,
    pub emp_exp: u32,
    pub home_ownership: String,
    pub loan_amount: u64,
    pub intent: String,
    pub interest_rate: f64,
    pub credit_history_years: u32,
    pub credit_score: u32,
    pub prior_default: String,
}

impl LoanApplication {
    /// Strictly validate a filled form.
    pub fn collect(form: &FormState) -> Result<Self, PredictError> {
        Ok(Self {
            age: whole(form, "person_age")?,
            gender: form.choice("person_gender")?.to_string(),
            education: form.choice("person_education")?.to_string(),
            income: whole(form, "person_income")?,
            emp_exp: whole(form, "person_emp_exp")?,
            home_ownership: form.choice("person_home_ownership")?.to_string(),
            loan_amount: whole(form, "loan_amnt")?,
            intent: form.choice("loan_intent")?.to_string(),
            interest_rate: form.strict("loan_int_rate")?,
            credit_history_years: whole(form, "cb_person_cred_hist_length")?,
            credit_score: whole(form, "credit_score")?,
            prior_default: form.choice("previous_loan_defaults_on_file")?.to_string(),
        })
    }
}

/// Strictly parsed whole number that must also fit the target integer type.
///
/// Income and loan amount are unbounded above, so "1e20" passes the field
/// check and would otherwise saturate on conversion.
fn whole<T: TryFrom<u64>>(form: &FormState, key: &str) -> Result<T, PredictError> {
    // 2^64: the first f64 that no u64 can hold.
    const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;
    let value = form.strict(key)?;
    if value < 0.0 || value >= U64_LIMIT {
        return Err(PredictError::invalid(format!("{key} is out of range (got {value})")));
    }
    T::try_from(value as u64)
        .map_err(|_| PredictError::invalid(format!("{key} is out of range (got {value})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_form() -> FormState {
        let mut form = FormState::new(&LOAN_FIELDS);
        form.set("person_age", "30").unwrap();
        form.set("person_gender", "Male").unwrap();
        form.set("person_education", "Bachelor").unwrap();
        form.set("person_income", "50000").unwrap();
        form.set("person_emp_exp", "5").unwrap();
        form.set("person_home_ownership", "Rent").unwrap();
        form.set("loan_amnt", "10000").unwrap();
        form.set("loan_intent", "Personal").unwrap();
        form.set("loan_int_rate", "12.5").unwrap();
        form.set("cb_person_cred_hist_length", "10").unwrap();
        form.set("credit_score", "700").unwrap();
        form.set("previous_loan_defaults_on_file", "No").unwrap();
        form
    }

    #[test]
    fn collect_reads_every_field() {
        let app = LoanApplication::collect(&scenario_form()).unwrap();
        assert_eq!(app.age, 30);
        assert_eq!(app.gender, "Male");
        assert_eq!(app.income, 50_000);
        assert_eq!(app.loan_amount, 10_000);
        assert_eq!(app.interest_rate, 12.5);
        assert_eq!(app.prior_default, "No");
    }

    #[test]
    fn age_boundaries() {
        let mut form = scenario_form();
        form.set("person_age", "18").unwrap();
        assert!(LoanApplication::collect(&form).is_ok());
        form.set("person_age", "17").unwrap();
        assert!(matches!(
            LoanApplication::collect(&form),
            Err(PredictError::InvalidInput(_))
        ));
    }

    #[test]
    fn credit_score_boundaries() {
        let mut form = scenario_form();
        for ok in ["300", "850"] {
            form.set("credit_score", ok).unwrap();
            assert!(LoanApplication::collect(&form).is_ok(), "{ok} should be accepted");
        }
        for bad in ["299", "851"] {
            form.set("credit_score", bad).unwrap();
            assert!(LoanApplication::collect(&form).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn interest_rate_bounds() {
        let mut form = scenario_form();
        form.set("loan_int_rate", "0.9").unwrap();
        assert!(LoanApplication::collect(&form).is_err());
        form.set("loan_int_rate", "50.0").unwrap();
        assert!(LoanApplication::collect(&form).is_ok());
    }

    #[test]
    fn unlisted_choice_is_rejected() {
        let mut form = scenario_form();
        form.set("loan_intent", "Travel").unwrap();
        assert!(LoanApplication::collect(&form).is_err());
    }

    #[test]
    fn oversized_amounts_are_rejected_not_saturated() {
        let mut form = scenario_form();
        form.set("person_income", "1e20").unwrap();
        assert!(matches!(
            LoanApplication::collect(&form),
            Err(PredictError::InvalidInput(_))
        ));

        form.set("person_income", "50000").unwrap();
        form.set("loan_amnt", "1e300").unwrap();
        assert!(matches!(
            LoanApplication::collect(&form),
            Err(PredictError::InvalidInput(_))
        ));

        form.set("loan_amnt", "1e15").unwrap();
        assert_eq!(LoanApplication::collect(&form).unwrap().loan_amount, 1_000_000_000_000_000);
    }
}
