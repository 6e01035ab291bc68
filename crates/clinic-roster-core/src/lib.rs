//! Clinic Roster Core Library
//!
//! Local-first data and statistics core for a desktop patient-roster
//! application. The presentation layer (forms, table, buttons, chart
//! rendering) lives outside this crate and calls in through [`Roster`].
//!
//! # Architecture
//!
//! ```text
//! UI Shell (forms / table / chart widgets)
//!     │  raw form text, selected id, delete confirmation
//!     ▼
//! Roster ── validate ──► Patient
//!     │
//!     ▼
//! PatientStore ── full rewrite on every mutation ──► roster JSON file
//!     │
//!     ▼
//! stats::aggregate ──► four chart datasets / insufficient-data markers
//! ```
//!
//! # Core Principle
//!
//! **Nothing here is fatal.** Invalid form input is reported back to the
//! form, storage failures degrade to an empty roster or leave the prior
//! state intact, and unusable records are excluded from derived charts
//! rather than raised as errors.
//!
//! # Modules
//!
//! - [`models`]: patient record, raw form input and validation
//! - [`store`]: versioned JSON file persistence
//! - [`bmi`]: Body Mass Index computation
//! - [`gender`]: free-text gender classification
//! - [`stats`]: chart dataset derivations

pub mod bmi;
pub mod gender;
pub mod models;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use gender::Gender;
pub use models::{Patient, PatientId, PatientInput, ValidatedInput, ValidationError};
pub use stats::{
    AgeBmiSeries, AgeDistribution, BmiByGender, ChartOutcome, GenderCounts, StatisticsReport,
    TrendLine,
};
pub use store::{PatientStore, RosterFile, StoreError, SCHEMA_VERSION};

use std::path::Path;

/// Errors surfaced across the UI-shell boundary.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// One table row: a patient plus its derived BMI.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRow {
    pub patient: Patient,
    /// `None` when the stored height/weight cannot produce a plausible BMI;
    /// the table shows a dash instead of a number.
    pub bmi: Option<f64>,
}

/// The service object the UI shell talks to.
///
/// All operations are synchronous and run to completion within one UI
/// dispatch; roster sizes are human-scale, so blocking is acceptable.
pub struct Roster {
    store: PatientStore,
}

impl Roster {
    /// Open the roster at `path`. Never fails: a missing file yields an
    /// empty roster, an unreadable one is logged and also yields an empty
    /// roster.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            store: PatientStore::open(path),
        }
    }

    /// All records in insertion order, each with its computed BMI.
    pub fn list(&self) -> Vec<PatientRow> {
        self.store
            .patients()
            .iter()
            .map(|patient| PatientRow {
                bmi: patient.bmi(),
                patient: patient.clone(),
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.store.get(id)
    }

    /// Validate raw form input and append a new record; persists
    /// immediately. On any error nothing is created or written.
    pub fn create(&mut self, input: &PatientInput) -> Result<Patient, RosterError> {
        let fields = input.validate()?;
        let patient = Patient::new(fields);
        self.store.create(patient.clone())?;
        Ok(patient)
    }

    /// Validate raw form input and replace the record with the given id,
    /// keeping its identity, creation timestamp and list position.
    pub fn update(&mut self, id: &str, input: &PatientInput) -> Result<Patient, RosterError> {
        let fields = input.validate()?;
        let mut patient = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::PatientNotFound(id.to_string()))?;
        patient.apply(fields);
        self.store.update(id, patient.clone())?;
        Ok(patient)
    }

    /// Delete the record with the given id, gated on the shell's explicit
    /// confirmation decision. `Ok(false)` means the user cancelled and
    /// nothing changed.
    pub fn delete(&mut self, id: &str, confirmed: bool) -> Result<bool, RosterError> {
        if !confirmed {
            return Ok(false);
        }
        self.store.delete(id)?;
        Ok(true)
    }

    /// Derive the four chart datasets from the current roster.
    pub fn aggregate(&self) -> StatisticsReport {
        stats::aggregate(self.store.patients())
    }

    /// The underlying store, for direct inspection.
    pub fn store(&self) -> &PatientStore {
        &self.store
    }
}
