//! Car listing form.
//!
//! Numeric car fields are free text in the UI: the live metrics panel reads them
//! leniently while the predict path parses them strictly.

use serde::{Deserialize, Serialize};

use crate::error::PredictError;
use crate::form::{ChoiceField, Field, FormState, NumericField};

pub const BRANDS: &[&str] = &[
    "Maruti",
    "Skoda",
    "Honda",
    "Hyundai",
    "Toyota",
    "Ford",
    "Renault",
    "Mahindra",
    "Tata",
    "Chevrolet",
    "Datsun",
    "Jeep",
    "Mercedes-Benz",
    "Mitsubishi",
    "Audi",
    "Volkswagen",
    "BMW",
    "Nissan",
    "Lexus",
    "Jaguar",
    "Land",
    "MG",
    "Volvo",
    "Daewoo",
    "Kia",
    "Fiat",
    "Force",
    "Ambassador",
    "Ashok",
    "Isuzu",
    "Opel",
];
pub const FUEL_TYPES: &[&str] = &["Petrol", "Diesel", "CNG", "LPG"];
pub const OWNER_TYPES: &[&str] = &[
    "First Owner",
    "Second Owner",
    "Third Owner",
    "Fourth & Above Owner",
    "Test Drive Car",
];
pub const SELLER_TYPES: &[&str] = &["Individual", "Dealer", "Trustmark Dealer"];
pub const TRANSMISSION_TYPES: &[&str] = &["Manual", "Automatic"];

pub static CAR_FIELDS: [Field; 11] = [
    Field::Choice(ChoiceField {
        key: "name",
        label: "Car Brand",
        options: BRANDS,
    }),
    Field::Choice(ChoiceField {
        key: "fuel",
        label: "Fuel Type",
        options: FUEL_TYPES,
    }),
    Field::Choice(ChoiceField {
        key: "transmission",
        label: "Transmission",
        options: TRANSMISSION_TYPES,
    }),
    Field::Choice(ChoiceField {
        key: "owner",
        label: "Owner Type",
        options: OWNER_TYPES,
    }),
    Field::Numeric(NumericField {
        key: "engine",
        label: "Engine Capacity (CC)",
        min: 500.0,
        max: None,
        default: 1200.0,
        step: 100.0,
        integer: true,
    }),
    Field::Numeric(NumericField {
        key: "max_power",
        label: "Max Power (hp)",
        min: 50.0,
        max: None,
        default: 120.0,
        step: 5.0,
        integer: true,
    }),
    Field::Numeric(NumericField {
        key: "mileage",
        label: "Mileage (kmpl)",
        min: 1.0,
        max: None,
        default: 20.0,
        step: 0.5,
        integer: false,
    }),
    Field::Numeric(NumericField {
        key: "seats",
        label: "Seating Capacity",
        min: 2.0,
        max: None,
        default: 5.0,
        step: 1.0,
        integer: true,
    }),
    Field::Numeric(NumericField {
        key: "km_driven",
        label: "Kilometers Driven",
        min: 0.0,
        max: None,
        default: 10000.0,
        step: 1000.0,
        integer: true,
    }),
    Field::Numeric(NumericField {
        key: "age",
        label: "Vehicle Age (years)",
        min: 0.0,
        max: None,
        default: 3.0,
        step: 1.0,
        integer: true,
    }),
    Field::Choice(ChoiceField {
        key: "seller_type",
        label: "Seller Type",
        options: SELLER_TYPES,
    }),
];

/// A validated car listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarListing {
    pub brand: String,
    pub fuel: String,
    pub transmission: String,
    pub owner: String,
    pub engine: f64,
    pub max_power: f64,
    pub mileage: f64,
    pub seats: f64,
    pub km_driven: f64,
    pub age: f64,
    pub seller_type: String,
}

impl CarListing {
    pub fn collect(form: &FormState) -> Result<Self, PredictError> {
        Ok(Self {
            brand: form.choice("name")?.to_string(),
            fuel: form.choice("fuel")?.to_string(),
            transmission: form.choice("transmission")?.to_string(),
            owner: form.choice("owner")?.to_string(),
            engine: form.strict("engine")?,
            max_power: form.strict("max_power")?,
            mileage: form.strict("mileage")?,
            seats: form.strict("seats")?,
            km_driven: form.strict("km_driven")?,
            age: form.strict("age")?,
            seller_type: form.choice("seller_type")?.to_string(),
        })
    }
}

/// Numbers behind the live metrics panel, read leniently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarLiveInputs {
    pub age: f64,
    pub km_driven: f64,
    pub mileage: f64,
    pub max_power: f64,
}

impl CarLiveInputs {
    pub fn from_form(form: &FormState) -> Self {
        Self {
            age: form.lenient("age"),
            km_driven: form.lenient("km_driven"),
            mileage: form.lenient("mileage"),
            max_power: form.lenient("max_power"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_collect_cleanly() {
        let listing = CarListing::collect(&FormState::new(&CAR_FIELDS)).unwrap();
        assert_eq!(listing.brand, "Maruti");
        assert_eq!(listing.engine, 1200.0);
        assert_eq!(listing.mileage, 20.0);
        assert_eq!(listing.seller_type, "Individual");
    }

    #[test]
    fn free_text_numbers_fail_only_on_the_strict_path() {
        let mut form = FormState::new(&CAR_FIELDS);
        form.set("engine", "").unwrap();
        form.set("age", "three").unwrap();

        let live = CarLiveInputs::from_form(&form);
        assert_eq!(live.age, 0.0);

        let err = CarListing::collect(&form).unwrap_err();
        assert!(matches!(err, PredictError::InvalidInput(_)));
    }

    #[test]
    fn below_minimum_is_rejected() {
        let mut form = FormState::new(&CAR_FIELDS);
        form.set("seats", "1").unwrap();
        assert!(CarListing::collect(&form).is_err());
    }
}
