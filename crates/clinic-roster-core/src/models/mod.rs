//! Domain models for the patient roster.

mod input;
mod patient;

pub use input::*;
pub use patient::*;
