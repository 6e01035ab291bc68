//! Body Mass Index computation.

/// Plausible human BMI range. Values at or below the lower bound, or above
/// the upper bound, are treated as garbage data rather than medical
/// outliers and excluded from every derived chart.
const BMI_MIN_EXCLUSIVE: f64 = 10.0;
const BMI_MAX_INCLUSIVE: f64 = 100.0;

/// Compute BMI from weight in kilograms and height in centimeters.
///
/// Returns `None` instead of an error for non-finite or non-positive
/// inputs and for results outside the plausible range, so callers simply
/// exclude the record from tables and charts.
pub fn compute(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if !weight_kg.is_finite() || !height_cm.is_finite() {
        return None;
    }
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }

    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);

    if bmi > BMI_MIN_EXCLUSIVE && bmi <= BMI_MAX_INCLUSIVE {
        Some(bmi)
    } else {
        None
    }
}
