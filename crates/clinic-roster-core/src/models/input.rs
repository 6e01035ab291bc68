//! Raw form input and validation.
//!
//! The UI shell hands over field values exactly as typed. Validation
//! happens synchronously at submit time; on failure the record is not
//! created or updated and the form stays open for correction.

use thiserror::Error;

/// Input validation failures, reported back to the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("patient name must not be empty")]
    EmptyName,

    #[error("age must be a positive whole number")]
    InvalidAge,

    #[error("height must be a positive number of centimeters")]
    InvalidHeight,

    #[error("weight must be a positive number of kilograms")]
    InvalidWeight,
}

/// The five form fields as raw, possibly invalid text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientInput {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub height_cm: String,
    pub weight_kg: String,
}

/// Typed, invariant-checked field values ready to build or update a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    /// Trimmed, non-empty
    pub name: String,
    /// Strictly positive
    pub age: i64,
    /// Verbatim as entered; classified at read time, never normalized here
    pub gender: String,
    /// Strictly positive, centimeters
    pub height_cm: f64,
    /// Strictly positive, kilograms
    pub weight_kg: f64,
}

impl PatientInput {
    /// Validate every field, returning the first failure.
    pub fn validate(&self) -> Result<ValidatedInput, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let age: i64 = self
            .age
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidAge)?;
        if age <= 0 {
            return Err(ValidationError::InvalidAge);
        }

        let height_cm = parse_positive_real(&self.height_cm).ok_or(ValidationError::InvalidHeight)?;
        let weight_kg = parse_positive_real(&self.weight_kg).ok_or(ValidationError::InvalidWeight)?;

        Ok(ValidatedInput {
            name: name.to_string(),
            age,
            gender: self.gender.clone(),
            height_cm,
            weight_kg,
        })
    }
}

/// Parse a strictly positive, finite real number.
fn parse_positive_real(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}
