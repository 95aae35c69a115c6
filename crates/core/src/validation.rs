//! Patient payload validation.
//!
//! This module contains the validator that stands between inbound payloads
//! and the lifecycle manager. It is stateless between calls: each entry
//! point is a pure function of the payload, the persisted snapshot exposed
//! by the store, and the injected clock.
//!
//! Check ordering is fixed: structural field checks run first and are
//! collected together (a payload with three bad fields reports three
//! fields), then reference existence, then the age ceiling, then duplicate
//! detection. A structurally invalid payload therefore never surfaces a
//! business error.

use crate::age;
use crate::constants::{DATE_FORMAT, PEDIATRIC_AGE_CEILING};
use crate::dedup::DuplicateDetector;
use crate::error::{PatientError, PatientResult, ValidationFailure};
use crate::patient::{CityId, Gender, HospitalId, Patient, PatientId};
use crate::store::{Clock, PatientStore, ReferenceDirectory};
use chrono::NaiveDate;
use pedreg_types::{PersonName, PhoneNumber};
use serde::Deserialize;

/// Inbound payload for registering a patient.
///
/// `age` and `registration_date` are intentionally absent: both are derived
/// by the engine and never accepted from a caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub full_name: String,
    pub gender: String,
    pub birth_date: String,
    pub city_id: CityId,
    pub hospital_id: HospitalId,
    pub tutor_name: String,
    pub tutor_phone: String,
}

/// Inbound payload for updating a patient. Used for both full updates
/// ([`UpdateMode::Full`], every field required) and partial updates
/// ([`UpdateMode::Partial`], absent fields left untouched).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientPatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub city_id: Option<CityId>,
    #[serde(default)]
    pub hospital_id: Option<HospitalId>,
    #[serde(default)]
    pub tutor_name: Option<String>,
    #[serde(default)]
    pub tutor_phone: Option<String>,
}

/// Whether an update must supply every mutable field or only some.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Full,
    Partial,
}

/// A validated creation payload, ready for the lifecycle manager to
/// persist. `age` and `registration_date` are already derived.
#[derive(Debug, Clone)]
pub struct PatientDraft {
    pub full_name: PersonName,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub age: u8,
    pub city_id: CityId,
    pub hospital_id: HospitalId,
    pub tutor_name: PersonName,
    pub tutor_phone: PhoneNumber,
    pub registration_date: NaiveDate,
}

/// The validated set of fields an update is allowed to touch. Fields left
/// as `None` keep their persisted values.
#[derive(Debug, Clone, Default)]
pub struct PatientChanges {
    pub full_name: Option<PersonName>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    /// Recomputed only when `birth_date` changed.
    pub age: Option<u8>,
    pub city_id: Option<CityId>,
    pub hospital_id: Option<HospitalId>,
    pub tutor_name: Option<PersonName>,
    pub tutor_phone: Option<PhoneNumber>,
}

impl PatientChanges {
    /// Merges the changes onto `existing`. Identity, `registration_date`
    /// and `created_at` are never touched.
    pub fn apply_to(self, mut existing: Patient) -> Patient {
        if let Some(full_name) = self.full_name {
            existing.full_name = full_name;
        }
        if let Some(gender) = self.gender {
            existing.gender = gender;
        }
        if let Some(birth_date) = self.birth_date {
            existing.birth_date = birth_date;
        }
        if let Some(age) = self.age {
            existing.age = age;
        }
        if let Some(city_id) = self.city_id {
            existing.city_id = city_id;
        }
        if let Some(hospital_id) = self.hospital_id {
            existing.hospital_id = hospital_id;
        }
        if let Some(tutor_name) = self.tutor_name {
            existing.tutor_name = tutor_name;
        }
        if let Some(tutor_phone) = self.tutor_phone {
            existing.tutor_phone = tutor_phone;
        }
        existing
    }
}

/// Validates creation and update payloads against the persisted snapshot.
pub struct PatientValidator<'a, S, D, C> {
    store: &'a S,
    directory: &'a D,
    clock: &'a C,
}

impl<'a, S, D, C> PatientValidator<'a, S, D, C>
where
    S: PatientStore,
    D: ReferenceDirectory,
    C: Clock,
{
    pub fn new(store: &'a S, directory: &'a D, clock: &'a C) -> Self {
        Self {
            store,
            directory,
            clock,
        }
    }

    /// Validates a creation payload.
    ///
    /// On success the returned draft carries the derived `age` and a
    /// `registration_date` of "today".
    ///
    /// # Errors
    ///
    /// `Validation` with every failing field, `UnknownCity`/
    /// `UnknownHospital`, `AgeCeilingExceeded`, or `DuplicatePatient` with
    /// the conflicting record's id.
    pub fn validate_create(&self, payload: &NewPatient) -> PatientResult<PatientDraft> {
        let today = self.clock.today();
        let mut failure = ValidationFailure::new();

        let full_name = check_name(&mut failure, "full_name", &payload.full_name);
        let gender = check_gender(&mut failure, &payload.gender);
        let birth_date = check_birth_date(&mut failure, &payload.birth_date, today);
        let tutor_name = check_name(&mut failure, "tutor_name", &payload.tutor_name);
        let tutor_phone = check_phone(&mut failure, &payload.tutor_phone);

        let (Some(full_name), Some(gender), Some(birth_date), Some(tutor_name), Some(tutor_phone)) =
            (full_name, gender, birth_date, tutor_name, tutor_phone)
        else {
            return Err(PatientError::Validation(failure));
        };

        self.check_references(Some(payload.city_id), Some(payload.hospital_id))?;
        let age = self.check_age_ceiling(birth_date, today)?;
        self.check_duplicate(full_name.as_str(), birth_date, None)?;

        Ok(PatientDraft {
            full_name,
            gender,
            birth_date,
            age,
            city_id: payload.city_id,
            hospital_id: payload.hospital_id,
            tutor_name,
            tutor_phone,
            registration_date: today,
        })
    }

    /// Validates an update payload against the record being updated.
    ///
    /// In [`UpdateMode::Partial`] only supplied fields are checked; absent
    /// fields inherit the persisted values for cross-field rules (the
    /// duplicate check uses the persisted birth date when the patch does not
    /// touch it). In [`UpdateMode::Full`] every mutable field must be
    /// present. The age ceiling is re-applied only when the birth date
    /// actually changes, and duplicate detection always excludes
    /// `existing.id`.
    pub fn validate_update(
        &self,
        existing: &Patient,
        payload: &PatientPatch,
        mode: UpdateMode,
    ) -> PatientResult<PatientChanges> {
        let today = self.clock.today();
        let mut failure = ValidationFailure::new();

        if mode == UpdateMode::Full {
            require_all_fields(&mut failure, payload);
        }

        let full_name = payload
            .full_name
            .as_deref()
            .and_then(|value| check_name(&mut failure, "full_name", value));
        let gender = payload
            .gender
            .as_deref()
            .and_then(|value| check_gender(&mut failure, value));
        let birth_date = payload
            .birth_date
            .as_deref()
            .and_then(|value| check_birth_date(&mut failure, value, today));
        let tutor_name = payload
            .tutor_name
            .as_deref()
            .and_then(|value| check_name(&mut failure, "tutor_name", value));
        let tutor_phone = payload
            .tutor_phone
            .as_deref()
            .and_then(|value| check_phone(&mut failure, value));

        if !failure.is_empty() {
            return Err(PatientError::Validation(failure));
        }

        self.check_references(payload.city_id, payload.hospital_id)?;

        let effective_birth = birth_date.unwrap_or(existing.birth_date);
        let birth_changed = birth_date.is_some_and(|date| date != existing.birth_date);
        let age = if birth_changed {
            Some(self.check_age_ceiling(effective_birth, today)?)
        } else {
            None
        };

        // A name-only patch can collide with an existing record through the
        // persisted birth date, and a date-only patch through the persisted
        // name, so either field triggers the re-check.
        if full_name.is_some() || birth_date.is_some() {
            let effective_name = full_name
                .as_ref()
                .map(PersonName::as_str)
                .unwrap_or_else(|| existing.full_name.as_str());
            self.check_duplicate(effective_name, effective_birth, Some(existing.id))?;
        }

        Ok(PatientChanges {
            full_name,
            gender,
            birth_date,
            age,
            city_id: payload.city_id,
            hospital_id: payload.hospital_id,
            tutor_name,
            tutor_phone,
        })
    }

    fn check_references(
        &self,
        city_id: Option<CityId>,
        hospital_id: Option<HospitalId>,
    ) -> PatientResult<()> {
        if let Some(city_id) = city_id {
            if !self.directory.city_exists(city_id)? {
                return Err(PatientError::UnknownCity(city_id));
            }
        }
        if let Some(hospital_id) = hospital_id {
            if !self.directory.hospital_exists(hospital_id)? {
                return Err(PatientError::UnknownHospital(hospital_id));
            }
        }
        Ok(())
    }

    fn check_age_ceiling(&self, birth_date: NaiveDate, today: NaiveDate) -> PatientResult<u8> {
        let years = age::years_elapsed(birth_date, today);
        if years > PEDIATRIC_AGE_CEILING {
            return Err(PatientError::AgeCeilingExceeded { age: years });
        }
        Ok(years as u8)
    }

    fn check_duplicate(
        &self,
        full_name: &str,
        birth_date: NaiveDate,
        exclude: Option<PatientId>,
    ) -> PatientResult<()> {
        let detector = DuplicateDetector::new(self.store);
        if let Some(existing_id) = detector.find_duplicate(full_name, birth_date, exclude)? {
            return Err(PatientError::DuplicatePatient { existing_id });
        }
        Ok(())
    }
}

fn check_name(failure: &mut ValidationFailure, field: &str, value: &str) -> Option<PersonName> {
    match PersonName::new(value) {
        Ok(name) => Some(name),
        Err(err) => {
            failure.push(field, err.to_string());
            None
        }
    }
}

fn check_phone(failure: &mut ValidationFailure, value: &str) -> Option<PhoneNumber> {
    match PhoneNumber::new(value) {
        Ok(phone) => Some(phone),
        Err(err) => {
            failure.push("tutor_phone", err.to_string());
            None
        }
    }
}

fn check_gender(failure: &mut ValidationFailure, value: &str) -> Option<Gender> {
    match Gender::parse(value) {
        Some(gender) => Some(gender),
        None => {
            failure.push("gender", "gender must be one of Masculino, Femenino, Otro");
            None
        }
    }
}

fn check_birth_date(
    failure: &mut ValidationFailure,
    value: &str,
    today: NaiveDate,
) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) if date < today => Some(date),
        Ok(_) => {
            failure.push("birth_date", "birth date must be before today");
            None
        }
        Err(_) => {
            failure.push("birth_date", "birth date must be a valid YYYY-MM-DD date");
            None
        }
    }
}

fn require_all_fields(failure: &mut ValidationFailure, payload: &PatientPatch) {
    let required = [
        ("full_name", payload.full_name.is_some()),
        ("gender", payload.gender.is_some()),
        ("birth_date", payload.birth_date.is_some()),
        ("city_id", payload.city_id.is_some()),
        ("hospital_id", payload.hospital_id.is_some()),
        ("tutor_name", payload.tutor_name.is_some()),
        ("tutor_phone", payload.tutor_phone.is_some()),
    ];
    for (field, present) in required {
        if !present {
            failure.push(field, "field is required");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDirectory, MemoryStore};
    use crate::store::FixedClock;
    use chrono::NaiveTime;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Today is pinned to 2025-06-15 for every test in this module.
    fn clock() -> FixedClock {
        FixedClock::on(date(2025, 6, 15))
    }

    fn directory() -> MemoryDirectory {
        MemoryDirectory::new()
            .with_city(CityId(1))
            .with_hospital(HospitalId(1))
    }

    fn payload() -> NewPatient {
        NewPatient {
            full_name: "Ana Lopez".into(),
            gender: "Femenino".into(),
            birth_date: "2015-04-10".into(),
            city_id: CityId(1),
            hospital_id: HospitalId(1),
            tutor_name: "Maria Lopez".into(),
            tutor_phone: "555-123-4567".into(),
        }
    }

    fn existing_patient(store: &mut MemoryStore) -> Patient {
        let draft = {
            let directory = directory();
            let clock = clock();
            let validator = PatientValidator::new(store, &directory, &clock);
            validator.validate_create(&payload()).unwrap()
        };
        let patient = Patient {
            id: PatientId(1),
            full_name: draft.full_name,
            gender: draft.gender,
            birth_date: draft.birth_date,
            age: draft.age,
            city_id: draft.city_id,
            hospital_id: draft.hospital_id,
            tutor_name: draft.tutor_name,
            tutor_phone: draft.tutor_phone,
            registration_date: draft.registration_date,
            created_at: date(2025, 6, 15).and_time(NaiveTime::MIN).and_utc(),
        };
        store.insert(patient.clone()).unwrap();
        patient
    }

    #[test]
    fn test_validate_create_derives_age_and_registration_date() {
        let store = MemoryStore::new();
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        let draft = validator.validate_create(&payload()).unwrap();
        assert_eq!(draft.age, 10);
        assert_eq!(draft.registration_date, date(2025, 6, 15));
        assert_eq!(draft.tutor_phone.as_str(), "5551234567");
    }

    #[test]
    fn test_validate_create_collects_every_structural_error() {
        let store = MemoryStore::new();
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        let mut bad = payload();
        bad.full_name = "   ".into();
        bad.gender = "Desconocido".into();
        bad.birth_date = "10/04/2015".into();

        let err = validator.validate_create(&bad).expect_err("should fail");
        let PatientError::Validation(failure) = err else {
            panic!("expected structural failure, got {err:?}");
        };
        assert_eq!(failure.errors().len(), 3);
        assert!(!failure.messages_for("full_name").is_empty());
        assert!(!failure.messages_for("gender").is_empty());
        assert!(!failure.messages_for("birth_date").is_empty());
    }

    #[test]
    fn test_structural_errors_report_before_business_errors() {
        let mut store = MemoryStore::new();
        existing_patient(&mut store);
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        // Duplicate name/date, but also a bad gender: the structural error
        // must win.
        let mut bad = payload();
        bad.gender = "X".into();
        let err = validator.validate_create(&bad).expect_err("should fail");
        assert!(matches!(err, PatientError::Validation(_)));
    }

    #[test]
    fn test_birth_date_today_is_rejected() {
        let store = MemoryStore::new();
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        let mut bad = payload();
        bad.birth_date = "2025-06-15".into();
        let err = validator.validate_create(&bad).expect_err("should fail");
        let PatientError::Validation(failure) = err else {
            panic!("expected structural failure");
        };
        assert!(failure.messages_for("birth_date")[0].contains("before today"));
    }

    #[test]
    fn test_age_ceiling_rejects_nineteen_accepts_eighteen() {
        let store = MemoryStore::new();
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        // Anniversary passed yesterday: 19 years old today.
        let mut over = payload();
        over.birth_date = "2006-06-14".into();
        let err = validator.validate_create(&over).expect_err("should fail");
        assert!(matches!(err, PatientError::AgeCeilingExceeded { age: 19 }));

        // Anniversary is tomorrow: still 18.
        let mut at_limit = payload();
        at_limit.birth_date = "2006-06-16".into();
        let draft = validator.validate_create(&at_limit).unwrap();
        assert_eq!(draft.age, 18);
    }

    #[test]
    fn test_unknown_references_are_reported() {
        let store = MemoryStore::new();
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        let mut bad_city = payload();
        bad_city.city_id = CityId(99);
        let err = validator.validate_create(&bad_city).expect_err("bad city");
        assert!(matches!(err, PatientError::UnknownCity(CityId(99))));

        let mut bad_hospital = payload();
        bad_hospital.hospital_id = HospitalId(99);
        let err = validator
            .validate_create(&bad_hospital)
            .expect_err("bad hospital");
        assert!(matches!(err, PatientError::UnknownHospital(HospitalId(99))));
    }

    #[test]
    fn test_duplicate_create_is_case_insensitive_and_carries_id() {
        let mut store = MemoryStore::new();
        existing_patient(&mut store);
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        let mut duplicate = payload();
        duplicate.full_name = "ana lopez".into();
        let err = validator
            .validate_create(&duplicate)
            .expect_err("should detect duplicate");
        assert!(matches!(
            err,
            PatientError::DuplicatePatient {
                existing_id: PatientId(1)
            }
        ));
    }

    #[test]
    fn test_update_does_not_report_itself_as_duplicate() {
        let mut store = MemoryStore::new();
        let existing = existing_patient(&mut store);
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        let patch = PatientPatch {
            full_name: Some("Ana Lopez".into()),
            ..PatientPatch::default()
        };
        let changes = validator
            .validate_update(&existing, &patch, UpdateMode::Partial)
            .unwrap();
        assert!(changes.full_name.is_some());
        assert!(changes.age.is_none());
    }

    #[test]
    fn test_partial_update_uses_persisted_birth_date_for_dedup() {
        let mut store = MemoryStore::new();
        let first = existing_patient(&mut store);
        let second = Patient {
            id: PatientId(2),
            full_name: PersonName::new("Otra Persona").unwrap(),
            birth_date: first.birth_date,
            ..first.clone()
        };
        store.insert(second.clone()).unwrap();
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        // Renaming the second patient to collide with the first, without
        // touching the birth date, must still be caught.
        let patch = PatientPatch {
            full_name: Some("ANA LOPEZ".into()),
            ..PatientPatch::default()
        };
        let err = validator
            .validate_update(&second, &patch, UpdateMode::Partial)
            .expect_err("should detect duplicate");
        assert!(matches!(
            err,
            PatientError::DuplicatePatient {
                existing_id: PatientId(1)
            }
        ));
    }

    #[test]
    fn test_birth_date_change_recomputes_age_and_reapplies_ceiling() {
        let mut store = MemoryStore::new();
        let existing = existing_patient(&mut store);
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        let patch = PatientPatch {
            birth_date: Some("2020-01-01".into()),
            ..PatientPatch::default()
        };
        let changes = validator
            .validate_update(&existing, &patch, UpdateMode::Partial)
            .unwrap();
        assert_eq!(changes.birth_date, Some(date(2020, 1, 1)));
        assert_eq!(changes.age, Some(5));

        let over = PatientPatch {
            birth_date: Some("2000-01-01".into()),
            ..PatientPatch::default()
        };
        let err = validator
            .validate_update(&existing, &over, UpdateMode::Partial)
            .expect_err("should fail ceiling");
        assert!(matches!(err, PatientError::AgeCeilingExceeded { age: 25 }));
    }

    #[test]
    fn test_full_update_reports_every_missing_field() {
        let mut store = MemoryStore::new();
        let existing = existing_patient(&mut store);
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        let patch = PatientPatch {
            full_name: Some("Ana Lopez".into()),
            ..PatientPatch::default()
        };
        let err = validator
            .validate_update(&existing, &patch, UpdateMode::Full)
            .expect_err("should require all fields");
        let PatientError::Validation(failure) = err else {
            panic!("expected structural failure");
        };
        // Six of the seven mutable fields are absent.
        assert_eq!(failure.errors().len(), 6);
        assert!(failure.messages_for("full_name").is_empty());
        assert_eq!(failure.messages_for("gender"), ["field is required"]);
    }

    #[test]
    fn test_partial_update_ignores_absent_fields() {
        let mut store = MemoryStore::new();
        let existing = existing_patient(&mut store);
        let directory = directory();
        let clock = clock();
        let validator = PatientValidator::new(&store, &directory, &clock);

        let patch = PatientPatch {
            tutor_phone: Some("(777) 888-9999".into()),
            ..PatientPatch::default()
        };
        let changes = validator
            .validate_update(&existing, &patch, UpdateMode::Partial)
            .unwrap();
        assert_eq!(changes.tutor_phone.unwrap().as_str(), "7778889999");
        assert!(changes.full_name.is_none());
        assert!(changes.birth_date.is_none());
        assert!(changes.age.is_none());
    }
}
