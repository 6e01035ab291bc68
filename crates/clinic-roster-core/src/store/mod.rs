//! JSON file persistence for the patient roster.
//!
//! The whole roster lives in one document, read fully at startup and
//! rewritten fully on every mutation. There is no incremental write and no
//! concurrent writer by construction (single process, single user).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Patient, PatientId};

/// Current persisted schema version. Files written before versioning was
/// introduced are a bare JSON array and load as version 0.
pub const SCHEMA_VERSION: u32 = 1;

/// Storage errors. Load failures are distinguished so callers and tests can
/// tell a missing file from a corrupt one, even though both degrade to an
/// empty roster at the service boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("roster file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("roster file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read roster file: {0}")]
    Read(io::Error),

    #[error("failed to write roster file: {0}")]
    Write(io::Error),

    #[error("no patient with id {0}")]
    PatientNotFound(PatientId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The loaded roster document.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterFile {
    /// Version found in the file; 0 for legacy bare-array files
    pub schema_version: u32,
    pub patients: Vec<Patient>,
}

/// Serialized layout of the current document version.
#[derive(Serialize)]
struct Document<'a> {
    schema_version: u32,
    patients: &'a [Patient],
}

impl RosterFile {
    /// Read and parse the document at `path`.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::FileNotFound(path.to_path_buf()))
            }
            Err(err) => return Err(StoreError::Read(err)),
        };
        let value: Value = serde_json::from_str(&text)?;
        Ok(Self::from_document(value))
    }

    /// Interpret a parsed document, accepting both the versioned layout and
    /// the legacy bare-array layout. Malformed records are salvaged
    /// field-by-field; records that are not objects are dropped.
    fn from_document(value: Value) -> Self {
        let (schema_version, raw_patients) = match value {
            Value::Array(items) => (0, items),
            Value::Object(mut map) => {
                let version = map
                    .get("schema_version")
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as u32;
                match map.remove("patients") {
                    Some(Value::Array(items)) => (version, items),
                    _ => {
                        log::warn!("roster document has no patient list; starting empty");
                        (version, Vec::new())
                    }
                }
            }
            _ => {
                log::warn!("roster document is neither an object nor an array; starting empty");
                (0, Vec::new())
            }
        };

        let patients = raw_patients.into_iter().filter_map(parse_record).collect();
        Self {
            schema_version,
            patients,
        }
    }
}

/// Parse one stored record, salvaging what a strict parse rejects and
/// minting an id for records that lack one.
fn parse_record(raw: Value) -> Option<Patient> {
    let mut patient = match serde_json::from_value::<Patient>(raw.clone()) {
        Ok(patient) => patient,
        Err(err) => {
            log::warn!("salvaging malformed patient record: {err}");
            match Patient::from_value(&raw) {
                Some(patient) => patient,
                None => {
                    log::warn!("dropping patient record that is not an object");
                    return None;
                }
            }
        }
    };
    if patient.id.is_empty() {
        patient.id = uuid::Uuid::new_v4().to_string();
    }
    Some(patient)
}

/// Owns the roster file path and the in-memory ordered collection.
///
/// Every successful mutation rewrites the file in full. A failed write
/// rolls the in-memory change back, so memory never claims a state that
/// disk does not hold.
pub struct PatientStore {
    path: PathBuf,
    patients: Vec<Patient>,
}

impl PatientStore {
    /// Open the store at `path`. A missing file yields an empty roster; an
    /// unreadable or corrupt file is logged and also yields an empty
    /// roster. Use [`RosterFile::load`] directly when the failure kind
    /// matters.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let patients = match RosterFile::load(&path) {
            Ok(file) => file.patients,
            Err(StoreError::FileNotFound(_)) => Vec::new(),
            Err(err) => {
                log::warn!(
                    "could not load roster file {}: {err}; starting empty",
                    path.display()
                );
                Vec::new()
            }
        };
        Self { path, patients }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in insertion order.
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    /// Serialize the full collection and overwrite the file.
    pub fn save(&self) -> StoreResult<()> {
        let document = Document {
            schema_version: SCHEMA_VERSION,
            patients: &self.patients,
        };
        let json = serde_json::to_string_pretty(&document)?;
        fs::write(&self.path, json).map_err(StoreError::Write)
    }

    /// Append a record and persist.
    pub fn create(&mut self, patient: Patient) -> StoreResult<()> {
        self.patients.push(patient);
        if let Err(err) = self.save() {
            self.patients.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Replace the record with the same id, keeping its position, and
    /// persist.
    pub fn update(&mut self, id: &str, patient: Patient) -> StoreResult<()> {
        let position = self
            .position(id)
            .ok_or_else(|| StoreError::PatientNotFound(id.to_string()))?;
        let previous = std::mem::replace(&mut self.patients[position], patient);
        if let Err(err) = self.save() {
            self.patients[position] = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Remove the record with the given id and persist. Returns the removed
    /// record.
    pub fn delete(&mut self, id: &str) -> StoreResult<Patient> {
        let position = self
            .position(id)
            .ok_or_else(|| StoreError::PatientNotFound(id.to_string()))?;
        let removed = self.patients.remove(position);
        if let Err(err) = self.save() {
            self.patients.insert(position, removed);
            return Err(err);
        }
        Ok(removed)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.patients.iter().position(|p| p.id == id)
    }
}
