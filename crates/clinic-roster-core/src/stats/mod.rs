//! Descriptive statistics derived from the patient roster.
//!
//! Four independent datasets back the statistics view: gender distribution,
//! age histogram, BMI-by-gender boxplot, and BMI-vs-age scatter with a
//! linear trend. Each derivation gates on a minimum amount of usable data
//! and reports [`ChartOutcome::Insufficient`] instead of failing, so the
//! shell renders a placeholder for one chart while the others draw
//! normally. Records with unusable values are silently excluded from the
//! affected dataset only.

use std::collections::HashSet;

use crate::gender::Gender;
use crate::models::Patient;

/// Oldest age, in years, considered plottable.
const MAX_PLOTTABLE_AGE: i64 = 120;

/// Outcome of a single chart derivation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome<T> {
    /// Enough usable data; payload ready for the renderer.
    Ready(T),
    /// The minimum-data gate was not met; render a placeholder instead.
    Insufficient,
}

impl<T> ChartOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ChartOutcome::Ready(_))
    }

    /// The payload, if the gate was met.
    pub fn ready(&self) -> Option<&T> {
        match self {
            ChartOutcome::Ready(data) => Some(data),
            ChartOutcome::Insufficient => None,
        }
    }
}

/// Male/female tallies for the gender distribution chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenderCounts {
    pub male: usize,
    pub female: usize,
}

impl GenderCounts {
    pub fn total(&self) -> usize {
        self.male + self.female
    }
}

/// Ages usable for the histogram, in roster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeDistribution {
    pub ages: Vec<i64>,
}

impl AgeDistribution {
    /// Histogram bin count: one per distinct age, capped at 10.
    pub fn suggested_bins(&self) -> usize {
        let distinct: HashSet<i64> = self.ages.iter().copied().collect();
        distinct.len().min(10)
    }
}

/// BMI samples bucketed by classified gender. Records classifying
/// [`Gender::Unknown`] are excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct BmiByGender {
    pub male: Vec<f64>,
    pub female: Vec<f64>,
}

/// Degree-1 least-squares fit over the scatter points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Trend value at `x`, for drawing the line.
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// (age, BMI) scatter with an optional trend line. The trend is omitted,
/// not an error, when the fit is degenerate.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeBmiSeries {
    pub points: Vec<(f64, f64)>,
    pub trend: Option<TrendLine>,
}

/// All four chart datasets for one statistics view.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsReport {
    pub gender: ChartOutcome<GenderCounts>,
    pub ages: ChartOutcome<AgeDistribution>,
    pub bmi_by_gender: ChartOutcome<BmiByGender>,
    pub bmi_vs_age: ChartOutcome<AgeBmiSeries>,
}

/// Derive all four datasets. The derivations are independent; a degenerate
/// dataset in one never affects the others.
pub fn aggregate(patients: &[Patient]) -> StatisticsReport {
    StatisticsReport {
        gender: gender_counts(patients),
        ages: age_distribution(patients),
        bmi_by_gender: bmi_by_gender(patients),
        bmi_vs_age: bmi_vs_age(patients),
    }
}

fn gender_counts(patients: &[Patient]) -> ChartOutcome<GenderCounts> {
    let mut counts = GenderCounts { male: 0, female: 0 };
    for patient in patients {
        match Gender::classify(&patient.gender) {
            Gender::Male => counts.male += 1,
            Gender::Female => counts.female += 1,
            Gender::Unknown => {}
        }
    }

    if counts.total() == 0 {
        ChartOutcome::Insufficient
    } else {
        ChartOutcome::Ready(counts)
    }
}

fn age_distribution(patients: &[Patient]) -> ChartOutcome<AgeDistribution> {
    let ages: Vec<i64> = patients
        .iter()
        .map(|p| p.age)
        .filter(|age| plottable_age(*age))
        .collect();

    if ages.is_empty() {
        ChartOutcome::Insufficient
    } else {
        ChartOutcome::Ready(AgeDistribution { ages })
    }
}

fn bmi_by_gender(patients: &[Patient]) -> ChartOutcome<BmiByGender> {
    let mut buckets = BmiByGender {
        male: Vec::new(),
        female: Vec::new(),
    };
    for patient in patients {
        let Some(bmi) = patient.bmi() else {
            continue;
        };
        match Gender::classify(&patient.gender) {
            Gender::Male => buckets.male.push(bmi),
            Gender::Female => buckets.female.push(bmi),
            Gender::Unknown => {}
        }
    }

    if buckets.male.is_empty() && buckets.female.is_empty() {
        ChartOutcome::Insufficient
    } else {
        ChartOutcome::Ready(buckets)
    }
}

fn bmi_vs_age(patients: &[Patient]) -> ChartOutcome<AgeBmiSeries> {
    let points: Vec<(f64, f64)> = patients
        .iter()
        .filter(|p| plottable_age(p.age))
        .filter_map(|p| p.bmi().map(|bmi| (p.age as f64, bmi)))
        .collect();

    // A trend needs at least two points to mean anything.
    if points.len() < 2 {
        return ChartOutcome::Insufficient;
    }

    let trend = linear_fit(&points);
    ChartOutcome::Ready(AgeBmiSeries { points, trend })
}

fn plottable_age(age: i64) -> bool {
    age > 0 && age <= MAX_PLOTTABLE_AGE
}

/// Ordinary least-squares fit. Returns `None` for degenerate input
/// (fewer than two points, or zero variance in x).
fn linear_fit(points: &[(f64, f64)]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }
    let first_x = points[0].0;
    if points.iter().all(|(x, _)| *x == first_x) {
        return None;
    }

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some(TrendLine { slope, intercept })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidatedInput;

    fn patient(name: &str, age: i64, gender: &str, height_cm: f64, weight_kg: f64) -> Patient {
        Patient::new(ValidatedInput {
            name: name.into(),
            age,
            gender: gender.into(),
            height_cm,
            weight_kg,
        })
    }

    #[test]
    fn test_empty_roster_is_insufficient_everywhere() {
        let report = aggregate(&[]);
        assert!(!report.gender.is_ready());
        assert!(!report.ages.is_ready());
        assert!(!report.bmi_by_gender.is_ready());
        assert!(!report.bmi_vs_age.is_ready());
    }

    #[test]
    fn test_single_valid_patient() {
        let roster = vec![patient("Иванов", 45, "М", 175.0, 70.0)];
        let report = aggregate(&roster);

        let counts = report.gender.ready().unwrap();
        assert_eq!(counts.male, 1);
        assert_eq!(counts.female, 0);

        let ages = report.ages.ready().unwrap();
        assert_eq!(ages.ages, vec![45]);

        let buckets = report.bmi_by_gender.ready().unwrap();
        assert_eq!(buckets.male.len(), 1);
        assert!(buckets.female.is_empty());

        // A scatter needs two points
        assert_eq!(report.bmi_vs_age, ChartOutcome::Insufficient);
    }

    #[test]
    fn test_unknown_gender_counts_in_age_only() {
        let roster = vec![patient("Безымянный", 30, "", 170.0, 65.0)];
        let report = aggregate(&roster);

        assert_eq!(report.gender, ChartOutcome::Insufficient);
        assert_eq!(report.bmi_by_gender, ChartOutcome::Insufficient);
        assert_eq!(report.ages.ready().unwrap().ages, vec![30]);
    }

    #[test]
    fn test_out_of_range_age_excluded() {
        let mut old = patient("Мафусаил", 45, "М", 175.0, 70.0);
        old.age = 150; // legacy data, no validation on load
        let roster = vec![old, patient("Петрова", 34, "Ж", 162.0, 55.0)];
        let report = aggregate(&roster);

        assert_eq!(report.ages.ready().unwrap().ages, vec![34]);
        // The 150-year-old still has a valid BMI and gender
        assert_eq!(report.gender.ready().unwrap().total(), 2);
        assert_eq!(report.bmi_by_gender.ready().unwrap().male.len(), 1);
        // ...but cannot contribute a scatter point
        assert_eq!(report.bmi_vs_age, ChartOutcome::Insufficient);
    }

    #[test]
    fn test_implausible_bmi_excluded_from_bmi_charts() {
        let roster = vec![
            patient("Иванов", 45, "М", 170.0, 500.0), // BMI ~173
            patient("Петрова", 34, "Ж", 162.0, 55.0),
        ];
        let report = aggregate(&roster);

        let buckets = report.bmi_by_gender.ready().unwrap();
        assert!(buckets.male.is_empty());
        assert_eq!(buckets.female.len(), 1);

        assert_eq!(report.ages.ready().unwrap().ages, vec![45, 34]);
        assert_eq!(report.bmi_vs_age, ChartOutcome::Insufficient);
    }

    #[test]
    fn test_scatter_with_trend() {
        let roster = vec![
            patient("a", 20, "М", 100.0, 20.0), // (20, 20)
            patient("b", 40, "Ж", 100.0, 30.0), // (40, 30)
        ];
        let report = aggregate(&roster);

        let series = report.bmi_vs_age.ready().unwrap();
        assert_eq!(series.points, vec![(20.0, 20.0), (40.0, 30.0)]);

        let trend = series.trend.unwrap();
        assert!((trend.slope - 0.5).abs() < 1e-9);
        assert!((trend.intercept - 10.0).abs() < 1e-9);
        assert!((trend.at(30.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_ages_omit_trend_but_keep_scatter() {
        let roster = vec![
            patient("a", 40, "М", 100.0, 20.0),
            patient("b", 40, "Ж", 100.0, 30.0),
            patient("c", 40, "М", 100.0, 25.0),
        ];
        let report = aggregate(&roster);

        let series = report.bmi_vs_age.ready().unwrap();
        assert_eq!(series.points.len(), 3);
        assert_eq!(series.trend, None);
    }

    #[test]
    fn test_suggested_bins() {
        let few = AgeDistribution { ages: vec![30, 30, 45] };
        assert_eq!(few.suggested_bins(), 2);

        let many = AgeDistribution {
            ages: (20..40).collect(),
        };
        assert_eq!(many.suggested_bins(), 10);
    }

    #[test]
    fn test_linear_fit_exact() {
        // y = 2x + 1
        let points = [(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)];
        let trend = linear_fit(&points).unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-9);
        assert!((trend.intercept - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_fit_degenerate() {
        assert_eq!(linear_fit(&[]), None);
        assert_eq!(linear_fit(&[(1.0, 2.0)]), None);
        assert_eq!(linear_fit(&[(5.0, 1.0), (5.0, 9.0)]), None);
    }
}
