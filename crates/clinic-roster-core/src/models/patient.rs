//! Patient record model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::input::ValidatedInput;

/// Stable patient identifier (UUID v4), minted once at creation and never
/// reused. All CRUD addressing goes through it; list position is only a
/// display-order concern.
pub type PatientId = String;

/// A patient record.
///
/// Invariants (non-empty name, positive age/height/weight) are enforced at
/// form-input time only. Records loaded from disk are trusted as-is and may
/// violate them; derived computations filter out values they cannot use
/// instead of failing.
///
/// Serialized field names (`height`, `weight`) stay wire-compatible with
/// roster files written before this crate existed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Stable ID; minted at load time for legacy records that lack one
    #[serde(default)]
    pub id: PatientId,
    /// Full name
    #[serde(default)]
    pub name: String,
    /// Age in whole years
    #[serde(default)]
    pub age: i64,
    /// Gender as entered on the form, stored verbatim
    #[serde(default)]
    pub gender: String,
    /// Height in centimeters
    #[serde(default, rename = "height")]
    pub height_cm: f64,
    /// Weight in kilograms
    #[serde(default, rename = "weight")]
    pub weight_kg: f64,
    /// Creation timestamp (RFC 3339)
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    #[serde(default)]
    pub updated_at: String,
}

impl Patient {
    /// Create a new record from validated form input.
    pub fn new(fields: ValidatedInput) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name,
            age: fields.age,
            gender: fields.gender,
            height_cm: fields.height_cm,
            weight_kg: fields.weight_kg,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Overwrite the editable fields from validated form input, keeping the
    /// id and creation timestamp.
    pub fn apply(&mut self, fields: ValidatedInput) {
        self.name = fields.name;
        self.age = fields.age;
        self.gender = fields.gender;
        self.height_cm = fields.height_cm;
        self.weight_kg = fields.weight_kg;
        self.touch();
    }

    /// Derived BMI, `None` when the stored height/weight cannot produce a
    /// plausible value.
    pub fn bmi(&self) -> Option<f64> {
        crate::bmi::compute(self.weight_kg, self.height_cm)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Salvage a record from an arbitrary JSON value, coercing each field
    /// individually and substituting safe defaults for anything unusable.
    /// Returns `None` if the value is not even an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            id: coerce_string(map.get("id")),
            name: coerce_string(map.get("name")),
            age: coerce_i64(map.get("age")),
            gender: coerce_string(map.get("gender")),
            height_cm: coerce_f64(map.get("height")),
            weight_kg: coerce_f64(map.get("weight")),
            created_at: coerce_string(map.get("created_at")),
            updated_at: coerce_string(map.get("updated_at")),
        })
    }
}

/// Coerce a JSON value to text; non-strings become empty.
fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Coerce a JSON value to a real number, accepting numeric strings.
/// Unusable values become 0.0, which every derived computation rejects.
fn coerce_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Coerce a JSON value to a whole number, accepting numeric strings and
/// truncating reals. Unusable values become 0.
fn coerce_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .unwrap_or_else(|| n.as_f64().map(|f| f as i64).unwrap_or(0)),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .unwrap_or_else(|_| trimmed.parse::<f64>().map(|f| f as i64).unwrap_or(0))
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> ValidatedInput {
        ValidatedInput {
            name: "Иванов Иван Иванович".into(),
            age: 45,
            gender: "М".into(),
            height_cm: 175.0,
            weight_kg: 70.0,
        }
    }

    #[test]
    fn test_new_patient() {
        let patient = Patient::new(fields());
        assert_eq!(patient.name, "Иванов Иван Иванович");
        assert_eq!(patient.age, 45);
        assert_eq!(patient.id.len(), 36); // UUID format
        assert_eq!(patient.created_at, patient.updated_at);
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut patient = Patient::new(fields());
        let id = patient.id.clone();
        let created = patient.created_at.clone();

        let mut updated = fields();
        updated.weight_kg = 82.5;
        patient.apply(updated);

        assert_eq!(patient.id, id);
        assert_eq!(patient.created_at, created);
        assert_eq!(patient.weight_kg, 82.5);
    }

    #[test]
    fn test_derived_bmi() {
        let patient = Patient::new(fields());
        let bmi = patient.bmi().unwrap();
        assert!((bmi - 22.86).abs() < 0.01);
    }

    #[test]
    fn test_from_value_coerces_numeric_strings() {
        let raw = json!({
            "name": "Петрова Анна",
            "age": "34",
            "gender": "Ж",
            "height": "162.5",
            "weight": 55
        });

        let patient = Patient::from_value(&raw).unwrap();
        assert_eq!(patient.age, 34);
        assert_eq!(patient.height_cm, 162.5);
        assert_eq!(patient.weight_kg, 55.0);
        assert!(patient.id.is_empty()); // loader mints one
    }

    #[test]
    fn test_from_value_defaults_for_garbage() {
        let raw = json!({
            "name": 42,
            "age": "сорок",
            "height": null
        });

        let patient = Patient::from_value(&raw).unwrap();
        assert_eq!(patient.name, "");
        assert_eq!(patient.age, 0);
        assert_eq!(patient.height_cm, 0.0);
        assert_eq!(patient.gender, "");
        assert_eq!(patient.bmi(), None);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert_eq!(Patient::from_value(&json!("just a string")), None);
        assert_eq!(Patient::from_value(&json!([1, 2, 3])), None);
    }
}
