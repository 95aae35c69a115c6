//! Collaborator seams: persistence, reference data, and time.
//!
//! The engine never reads ambient state. Every operation is a function of
//! its inputs plus the snapshot its collaborators expose, so "today" comes
//! from an injected [`Clock`] and all reads and writes go through
//! [`PatientStore`] and [`ReferenceDirectory`]. This keeps age-boundary and
//! duplicate-date behaviour deterministic under test.

use crate::error::PatientResult;
use crate::patient::{CityId, HospitalId, Patient, PatientId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Read/write access to the patient collection.
///
/// The duplicate check and the subsequent insert/update run as one logical
/// operation from the engine's point of view. Implementations backed by a
/// shared database should wrap check-then-write in a transaction and back it
/// with a unique index on (`lower(full_name)`, `birth_date`), or accept the
/// narrow race window between the check and the write.
pub trait PatientStore {
    /// Fetch a patient by id.
    fn find(&self, id: PatientId) -> PatientResult<Option<Patient>>;

    /// All patients whose full name equals `full_name` case-insensitively
    /// and whose birth date equals `birth_date` exactly (calendar date, not
    /// time of day).
    fn find_by_name_and_birth_date(
        &self,
        full_name: &str,
        birth_date: NaiveDate,
    ) -> PatientResult<Vec<Patient>>;

    /// Every patient, ordered by full name (case-insensitive), as listing
    /// endpoints present them.
    fn list_ordered_by_name(&self) -> PatientResult<Vec<Patient>>;

    /// The `limit` most recently created patients, newest first.
    fn recent(&self, limit: usize) -> PatientResult<Vec<Patient>>;

    /// Reserve a fresh identity for a record about to be inserted.
    fn allocate_id(&mut self) -> PatientResult<PatientId>;

    /// Persist a newly created record.
    fn insert(&mut self, patient: Patient) -> PatientResult<()>;

    /// Persist changes to an existing record.
    fn update(&mut self, patient: &Patient) -> PatientResult<()>;

    /// Remove `id`, reporting whether a record existed.
    fn delete(&mut self, id: PatientId) -> PatientResult<bool>;
}

/// Existence checks for the city/hospital references a patient carries.
pub trait ReferenceDirectory {
    fn city_exists(&self, id: CityId) -> PatientResult<bool>;
    fn hospital_exists(&self, id: HospitalId) -> PatientResult<bool>;
}

/// Source of "today" for age derivation and date comparisons.
pub trait Clock {
    fn today(&self) -> NaiveDate;
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a known instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Pins the clock to midnight UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0.date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
