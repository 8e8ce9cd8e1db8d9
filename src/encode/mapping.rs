//! Fixed label → code tables for the loan model's categorical fields.
//!
//! Codes were assigned when the model was trained. Renumbering any entry
//! requires retraining.

use crate::error::PredictError;

pub const GENDER_CODES: &[(&str, i64)] = &[("Female", 0), ("Male", 1)];
pub const EDUCATION_CODES: &[(&str, i64)] = &[
    ("Associate", 0),
    ("Bachelor", 1),
    ("Doctorate", 2),
    ("High School", 3),
    ("Master", 4),
];
pub const HOME_OWNERSHIP_CODES: &[(&str, i64)] = &[("Mortgage", 0), ("Other", 1), ("Own", 2), ("Rent", 3)];
pub const LOAN_INTENT_CODES: &[(&str, i64)] = &[
    ("Debt Consolidation", 0),
    ("Education", 1),
    ("Home Improvement", 2),
    ("Medical", 3),
    ("Personal", 4),
    ("Venture", 5),
];
pub const PRIOR_DEFAULT_CODES: &[(&str, i64)] = &[("No", 0), ("Yes", 1)];

/// A validated categorical mapping for one field.
#[derive(Debug, Clone, Copy)]
pub struct CategoryMapping {
    field: &'static str,
    entries: &'static [(&'static str, i64)],
}

impl CategoryMapping {
    /// Build a mapping, rejecting duplicate labels or codes.
    pub fn new(field: &'static str, entries: &'static [(&'static str, i64)]) -> Result<Self, PredictError> {
        for (i, (label, code)) in entries.iter().enumerate() {
            for (other_label, other_code) in &entries[i + 1..] {
                if label == other_label {
                    return Err(PredictError::invalid(format!(
                        "mapping '{field}' lists label '{label}' twice"
                    )));
                }
                if code == other_code {
                    return Err(PredictError::invalid(format!(
                        "mapping '{field}' assigns code {code} to both '{label}' and '{other_label}'"
                    )));
                }
            }
        }
        Ok(Self { field, entries })
    }

    /// Build a mapping and check that every offered option has a code.
    pub fn for_options(
        field: &'static str,
        entries: &'static [(&'static str, i64)],
        options: &[&str],
    ) -> Result<Self, PredictError> {
        let mapping = Self::new(field, entries)?;
        if let Some(missing) = options.iter().find(|opt| mapping.code(opt).is_err()) {
            return Err(PredictError::invalid(format!(
                "option '{missing}' offered for '{field}' has no code"
            )));
        }
        Ok(mapping)
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Exact-match lookup.
    pub fn code(&self, label: &str) -> Result<i64, PredictError> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, code)| *code)
            .ok_or_else(|| PredictError::unknown_category(self.field, label))
    }
}
