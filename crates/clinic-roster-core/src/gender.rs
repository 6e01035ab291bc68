//! Gender classification from free-text form input.
//!
//! The gender field is stored verbatim as entered and only interpreted at
//! read time, so stored data may be Russian or English, any case, short or
//! long form.

/// Keywords recognized as male. Checked before the female set; a hit
/// short-circuits, so a value matching both sets classifies male
/// (e.g. English "female" contains "male").
const MALE_KEYWORDS: &[&str] = &["м", "m", "муж", "male", "мужской", "мужчина"];

/// Keywords recognized as female.
const FEMALE_KEYWORDS: &[&str] = &["ж", "жен", "female", "женский", "женщина"];

/// Classified gender category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    /// No keyword matched. Excluded from gender-partitioned aggregates but
    /// still counted in age-only aggregates.
    Unknown,
}

impl Gender {
    /// Classify a raw gender value by substring keyword match,
    /// first-match-wins with the male set checked first.
    pub fn classify(raw: &str) -> Gender {
        let normalized = raw.trim().to_lowercase();

        if MALE_KEYWORDS.iter().any(|kw| normalized.contains(kw)) {
            return Gender::Male;
        }
        if FEMALE_KEYWORDS.iter().any(|kw| normalized.contains(kw)) {
            return Gender::Female;
        }
        Gender::Unknown
    }
}
