//! # Pedreg Core
//!
//! Core business logic for the pediatric patient registry.
//!
//! This crate contains the patient eligibility and deduplication engine:
//! - Calendar-aware age derivation and the pediatric age ceiling
//! - Duplicate registration detection (case-insensitive name + birth date)
//! - Creation/update validation with per-field error reporting
//! - The patient lifecycle manager, the only component that writes records
//! - Pagination metadata for listing endpoints
//!
//! **No transport concerns**: HTTP routing, PDF rendering and persistence
//! schema belong to the callers. Persistence, reference data (cities and
//! hospitals) and the clock are injected through the traits in [`store`].

pub mod age;
pub mod constants;
pub mod dedup;
pub mod error;
pub mod memory;
pub mod pagination;
pub mod patient;
pub mod service;
pub mod store;
pub mod validation;

pub use dedup::DuplicateDetector;
pub use error::{PatientError, PatientResult, ValidationFailure};
pub use memory::{MemoryDirectory, MemoryStore};
pub use pagination::{Page, PageMeta, PageRequest};
pub use patient::{CityId, Gender, HospitalId, Patient, PatientId};
pub use service::PatientService;
pub use store::{Clock, FixedClock, PatientStore, ReferenceDirectory, SystemClock};
pub use validation::{
    NewPatient, PatientChanges, PatientDraft, PatientPatch, PatientValidator, UpdateMode,
};
