//! Feature encoding: validated form values → the ordered row a model was fit on.
//!
//! Field order is part of the model contract. A reordered row still predicts,
//! just wrongly, so both schemas are fixed constant arrays and every vector is
//! built by walking them.

pub mod mapping;

use serde::Serialize;

use crate::error::PredictError;
use crate::form::loan::{EDUCATION_LEVELS, GENDERS, HOME_OWNERSHIP, LOAN_INTENTS, PRIOR_DEFAULTS};
use crate::form::{CarListing, LoanApplication};

pub use mapping::CategoryMapping;
use mapping::{EDUCATION_CODES, GENDER_CODES, HOME_OWNERSHIP_CODES, LOAN_INTENT_CODES, PRIOR_DEFAULT_CODES};

/// Loan model input schema (13 numeric fields).
pub const LOAN_FEATURES: [&str; 13] = [
    "person_age",
    "person_gender",
    "person_education",
    "person_income",
    "person_emp_exp",
    "person_home_ownership",
    "loan_amnt",
    "loan_intent",
    "loan_int_rate",
    "loan_percent_income",
    "cb_person_cred_hist_length",
    "credit_score",
    "previous_loan_defaults_on_file",
];

/// Car pipeline input schema (11 fields; categorical ones stay strings).
pub const CAR_FEATURES: [&str; 11] = [
    "name",
    "age",
    "km_driven",
    "fuel",
    "seller_type",
    "transmission",
    "owner",
    "mileage",
    "engine",
    "max_power",
    "seats",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

/// An ordered, named feature row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    fields: Vec<(&'static str, FeatureValue)>,
}

impl FeatureVector {
    pub fn new(fields: Vec<(&'static str, FeatureValue)>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(name, _)| *name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(FeatureValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// The row as plain numbers, in order. Fails if any field is still a string.
    pub fn to_numeric(&self) -> Result<Vec<f64>, PredictError> {
        self.fields
            .iter()
            .map(|(name, value)| match value {
                FeatureValue::Number(v) => Ok(*v),
                FeatureValue::Text(label) => Err(PredictError::invalid(format!(
                    "feature '{name}' is the raw label '{label}'; this model needs an encoded row"
                ))),
            })
            .collect()
    }
}

/// Loan-to-income ratio, rounded to 4 decimals; 0 when income is not positive.
///
/// The display and the model both read this value, never a recomputation.
pub fn loan_percent_income(loan_amount: f64, income: f64) -> f64 {
    if income > 0.0 {
        round_to(loan_amount / income, 4)
    } else {
        0.0
    }
}

/// Round half to even on the exact binary value, like Python's `round(x, n)`.
///
/// Scaling by `10^n` first would round ties away from zero (0.78125 -> 0.7813).
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse::<f64>().unwrap_or(value)
}

/// The loan categorical tables, validated against the form's option lists.
#[derive(Debug, Clone, Copy)]
pub struct LoanEncoder {
    gender: CategoryMapping,
    education: CategoryMapping,
    home_ownership: CategoryMapping,
    intent: CategoryMapping,
    prior_default: CategoryMapping,
}

impl LoanEncoder {
    pub fn new() -> Result<Self, PredictError> {
        Ok(Self {
            gender: CategoryMapping::for_options("person_gender", GENDER_CODES, GENDERS)?,
            education: CategoryMapping::for_options("person_education", EDUCATION_CODES, EDUCATION_LEVELS)?,
            home_ownership: CategoryMapping::for_options(
                "person_home_ownership",
                HOME_OWNERSHIP_CODES,
                HOME_OWNERSHIP,
            )?,
            intent: CategoryMapping::for_options("loan_intent", LOAN_INTENT_CODES, LOAN_INTENTS)?,
            prior_default: CategoryMapping::for_options(
                "previous_loan_defaults_on_file",
                PRIOR_DEFAULT_CODES,
                PRIOR_DEFAULTS,
            )?,
        })
    }

    pub fn mappings(&self) -> [&CategoryMapping; 5] {
        [
            &self.gender,
            &self.education,
            &self.home_ownership,
            &self.intent,
            &self.prior_default,
        ]
    }

    pub fn encode(&self, app: &LoanApplication) -> Result<FeatureVector, PredictError> {
        let income = app.income as f64;
        let amount = app.loan_amount as f64;

        let mut fields = Vec::with_capacity(LOAN_FEATURES.len());
        for name in LOAN_FEATURES {
            let value = match name {
                "person_age" => f64::from(app.age),
                "person_gender" => self.gender.code(&app.gender)? as f64,
                "person_education" => self.education.code(&app.education)? as f64,
                "person_income" => income,
                "person_emp_exp" => f64::from(app.emp_exp),
                "person_home_ownership" => self.home_ownership.code(&app.home_ownership)? as f64,
                "loan_amnt" => amount,
                "loan_intent" => self.intent.code(&app.intent)? as f64,
                "loan_int_rate" => app.interest_rate,
                "loan_percent_income" => loan_percent_income(amount, income),
                "cb_person_cred_hist_length" => f64::from(app.credit_history_years),
                "credit_score" => f64::from(app.credit_score),
                "previous_loan_defaults_on_file" => self.prior_default.code(&app.prior_default)? as f64,
                other => return Err(PredictError::invalid(format!("no encoder for loan feature '{other}'"))),
            };
            fields.push((name, FeatureValue::Number(value)));
        }
        Ok(FeatureVector::new(fields))
    }
}

/// Encode a loan application with freshly validated tables.
pub fn encode_loan(app: &LoanApplication) -> Result<FeatureVector, PredictError> {
    LoanEncoder::new()?.encode(app)
}

/// Type and order a car listing; categorical encoding is left to the model pipeline.
pub fn encode_car(listing: &CarListing) -> FeatureVector {
    let fields = CAR_FEATURES
        .iter()
        .map(|&name| {
            let value = match name {
                "name" => FeatureValue::Text(listing.brand.clone()),
                "age" => FeatureValue::Number(listing.age),
                "km_driven" => FeatureValue::Number(listing.km_driven),
                "fuel" => FeatureValue::Text(listing.fuel.clone()),
                "seller_type" => FeatureValue::Text(listing.seller_type.clone()),
                "transmission" => FeatureValue::Text(listing.transmission.clone()),
                "owner" => FeatureValue::Text(listing.owner.clone()),
                "mileage" => FeatureValue::Number(listing.mileage),
                "engine" => FeatureValue::Number(listing.engine),
                "max_power" => FeatureValue::Number(listing.max_power),
                _ => FeatureValue::Number(listing.seats),
            };
            (name, value)
        })
        .collect();
    FeatureVector::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::loan::LOAN_FIELDS;
    use crate::form::{CAR_FIELDS, FormState};

    fn scenario_app() -> LoanApplication {
        LoanApplication {
            age: 30,
            gender: "Male".into(),
            education: "Bachelor".into(),
            income: 50_000,
            emp_exp: 5,
            home_ownership: "Rent".into(),
            loan_amount: 10_000,
            intent: "Personal".into(),
            interest_rate: 12.5,
            credit_history_years: 10,
            credit_score: 700,
            prior_default: "No".into(),
        }
    }

    #[test]
    fn every_label_encodes_to_its_table_code() {
        let encoder = LoanEncoder::new().unwrap();
        let tables = [
            ("person_gender", GENDER_CODES),
            ("person_education", EDUCATION_CODES),
            ("person_home_ownership", HOME_OWNERSHIP_CODES),
            ("loan_intent", LOAN_INTENT_CODES),
            ("previous_loan_defaults_on_file", PRIOR_DEFAULT_CODES),
        ];
        for (field, table) in tables {
            for &(label, code) in table {
                let mut app = scenario_app();
                match field {
                    "person_gender" => app.gender = label.into(),
                    "person_education" => app.education = label.into(),
                    "person_home_ownership" => app.home_ownership = label.into(),
                    "loan_intent" => app.intent = label.into(),
                    _ => app.prior_default = label.into(),
                }
                let v = encoder.encode(&app).unwrap();
                assert_eq!(v.number(field), Some(code as f64), "{field}={label}");
            }
        }
    }

    #[test]
    fn unknown_label_raises_unknown_category() {
        let mut app = scenario_app();
        app.intent = "Travel".into();
        assert_eq!(
            encode_loan(&app).unwrap_err(),
            PredictError::unknown_category("loan_intent", "Travel")
        );
    }

    #[test]
    fn ratio_is_rounded_deterministic_and_zero_safe() {
        assert_eq!(loan_percent_income(10_000.0, 50_000.0), 0.2);
        assert_eq!(loan_percent_income(1.0, 3.0), 0.3333);
        assert_eq!(loan_percent_income(2.0, 3.0), 0.6667);
        assert_eq!(loan_percent_income(1.0, 3.0), loan_percent_income(1.0, 3.0));
        assert_eq!(loan_percent_income(10_000.0, 0.0), 0.0);
        assert_eq!(loan_percent_income(10_000.0, -5.0), 0.0);
    }

    #[test]
    fn ratio_ties_round_to_even() {
        assert_eq!(loan_percent_income(1000.0, 1280.0), 0.7812);
        assert_eq!(loan_percent_income(4000.0, 1024.0), 3.9062);
    }

    #[test]
    fn loan_scenario_vector_matches_schema_order() {
        let v = encode_loan(&scenario_app()).unwrap();
        assert_eq!(v.names(), LOAN_FEATURES.to_vec());
        assert_eq!(
            v.to_numeric().unwrap(),
            vec![30.0, 1.0, 1.0, 50_000.0, 5.0, 3.0, 10_000.0, 4.0, 12.5, 0.2, 10.0, 700.0, 0.0]
        );
    }

    #[test]
    fn loan_form_options_all_have_codes() {
        let encoder = LoanEncoder::new().unwrap();
        for field in LOAN_FIELDS.iter() {
            if let crate::form::Field::Choice(choice) = field {
                let mapping = encoder
                    .mappings()
                    .into_iter()
                    .find(|m| m.field() == choice.key)
                    .unwrap();
                for opt in choice.options {
                    assert!(mapping.code(opt).is_ok(), "{} missing {opt}", choice.key);
                }
            }
        }
    }

    #[test]
    fn car_vector_keeps_raw_strings_in_order() {
        let listing = CarListing::collect(&FormState::new(&CAR_FIELDS)).unwrap();
        let v = encode_car(&listing);
        assert_eq!(v.names(), CAR_FEATURES.to_vec());
        assert_eq!(v.get("name"), Some(&FeatureValue::Text("Maruti".into())));
        assert_eq!(v.number("engine"), Some(1200.0));
        assert!(v.to_numeric().is_err());
    }
}
