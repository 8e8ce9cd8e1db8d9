//! Form collection: field specs, form state, and validated application structs.
//!
//! The CLI and the TUI both fill a `FormState` and then call the same
//! `collect` function, so validation lives in exactly one place.

pub mod car;
pub mod field;
pub mod loan;

pub use car::{CAR_FIELDS, CarListing};
pub use field::{ChoiceField, Field, NumericField, parse_lenient};
pub use loan::{LOAN_FIELDS, LoanApplication};

use crate::error::PredictError;

/// Raw user-entered values for one form, in declaration order.
#[derive(Debug, Clone)]
pub struct FormState {
    fields: &'static [Field],
    values: Vec<String>,
}

impl FormState {
    /// A form with every field at its default.
    pub fn new(fields: &'static [Field]) -> Self {
        Self {
            fields,
            values: fields.iter().map(Field::default_text).collect(),
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, idx: usize) -> Option<&'static Field> {
        self.fields.get(idx)
    }

    pub fn text_at(&self, idx: usize) -> &str {
        self.values.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Raw text for `key` (empty when the key is unknown).
    pub fn text(&self, key: &str) -> &str {
        self.position(key).map(|idx| self.text_at(idx)).unwrap_or("")
    }

    /// Overwrite the raw text for `key`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), PredictError> {
        let idx = self
            .position(key)
            .ok_or_else(|| PredictError::invalid(format!("unknown form field '{key}'")))?;
        self.values[idx] = value.into();
        Ok(())
    }

    pub fn set_at(&mut self, idx: usize, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(idx) {
            *slot = value.into();
        }
    }

    /// Step a numeric field by `delta * step` or cycle a choice field by `delta`.
    ///
    /// Unparseable numeric text is treated as the field default before stepping.
    pub fn adjust(&mut self, idx: usize, delta: i32) {
        let Some(field) = self.fields.get(idx) else {
            return;
        };
        let next = match field {
            Field::Numeric(spec) => {
                let current = spec
                    .parse_strict(self.text_at(idx))
                    .unwrap_or(spec.default);
                let stepped = spec.clamp(current + spec.step * f64::from(delta));
                spec.format_value(stepped)
            }
            Field::Choice(spec) => {
                let n = spec.options.len() as i64;
                if n == 0 {
                    return;
                }
                let cur = spec.index_of(self.text_at(idx)).unwrap_or(0) as i64;
                let next = (cur + i64::from(delta)).rem_euclid(n) as usize;
                spec.options[next].to_string()
            }
        };
        self.values[idx] = next;
    }

    /// Live-display value: never fails, 0 on bad input.
    pub fn lenient(&self, key: &str) -> f64 {
        parse_lenient(self.text(key))
    }

    /// Predict-path value: bounds-checked, `InvalidInput` on bad input.
    pub fn strict(&self, key: &str) -> Result<f64, PredictError> {
        match self.spec(key)? {
            Field::Numeric(spec) => spec.parse_strict(self.text(key)),
            Field::Choice(spec) => Err(PredictError::invalid(format!(
                "{} is a choice field, not a number",
                spec.label
            ))),
        }
    }

    /// Predict-path label: must be one of the enumerated options.
    pub fn choice(&self, key: &str) -> Result<&'static str, PredictError> {
        match self.spec(key)? {
            Field::Choice(spec) => spec.validate(self.text(key)),
            Field::Numeric(spec) => Err(PredictError::invalid(format!(
                "{} is a numeric field, not a choice",
                spec.label
            ))),
        }
    }

    fn spec(&self, key: &str) -> Result<&'static Field, PredictError> {
        self.fields
            .iter()
            .find(|f| f.key() == key)
            .ok_or_else(|| PredictError::invalid(format!("unknown form field '{key}'")))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key() == key)
    }
}
