//! Patient lifecycle manager.
//!
//! `PatientService` is the only component that writes patient records. It
//! runs each payload through the validator, then applies the result through
//! the injected store: creation stamps the identity, `registration_date`
//! and `created_at`; updates merge validated fields without ever touching
//! the immutable ones; deletion reports the removed id and fails with
//! `NotFound` on every repeat.
//!
//! **No API concerns**: routing, status codes and wire envelopes belong to
//! the transport calling in.

use crate::error::{PatientError, PatientResult};
use crate::pagination::{Page, PageRequest};
use crate::patient::{Patient, PatientId};
use crate::store::{Clock, PatientStore, ReferenceDirectory};
use crate::validation::{NewPatient, PatientPatch, PatientValidator, UpdateMode};

pub struct PatientService<S, D, C> {
    store: S,
    directory: D,
    clock: C,
}

impl<S, D, C> PatientService<S, D, C>
where
    S: PatientStore,
    D: ReferenceDirectory,
    C: Clock,
{
    pub fn new(store: S, directory: D, clock: C) -> Self {
        Self {
            store,
            directory,
            clock,
        }
    }

    /// Registers a new patient.
    ///
    /// This is the only place `registration_date` is ever written.
    ///
    /// # Errors
    ///
    /// Any validation error from
    /// [`PatientValidator::validate_create`], or a storage error from the
    /// collaborator.
    pub fn create(&mut self, payload: &NewPatient) -> PatientResult<Patient> {
        let validator = PatientValidator::new(&self.store, &self.directory, &self.clock);
        let draft = match validator.validate_create(payload) {
            Ok(draft) => draft,
            Err(err) => {
                tracing::warn!(error = %err, "patient registration rejected");
                return Err(err);
            }
        };

        let id = self.store.allocate_id()?;
        let patient = Patient {
            id,
            full_name: draft.full_name,
            gender: draft.gender,
            birth_date: draft.birth_date,
            age: draft.age,
            city_id: draft.city_id,
            hospital_id: draft.hospital_id,
            tutor_name: draft.tutor_name,
            tutor_phone: draft.tutor_phone,
            registration_date: draft.registration_date,
            created_at: self.clock.now(),
        };
        self.store.insert(patient.clone())?;
        tracing::info!(patient_id = %patient.id, "patient registered");
        Ok(patient)
    }

    /// Applies a full or partial update to an existing patient.
    ///
    /// `age` is recomputed only when the birth date changed;
    /// `registration_date` and `created_at` are never altered.
    pub fn update(
        &mut self,
        id: PatientId,
        payload: &PatientPatch,
        mode: UpdateMode,
    ) -> PatientResult<Patient> {
        let existing = self.store.find(id)?.ok_or(PatientError::NotFound(id))?;
        let validator = PatientValidator::new(&self.store, &self.directory, &self.clock);
        let changes = match validator.validate_update(&existing, payload, mode) {
            Ok(changes) => changes,
            Err(err) => {
                tracing::warn!(patient_id = %id, error = %err, "patient update rejected");
                return Err(err);
            }
        };

        let updated = changes.apply_to(existing);
        self.store.update(&updated)?;
        tracing::info!(patient_id = %id, "patient updated");
        Ok(updated)
    }

    /// Deletes a patient, returning the removed id.
    ///
    /// Repeated deletes of the same id keep failing with `NotFound`; the
    /// first success is never silently repeated.
    pub fn delete(&mut self, id: PatientId) -> PatientResult<PatientId> {
        if self.store.delete(id)? {
            tracing::info!(patient_id = %id, "patient deleted");
            Ok(id)
        } else {
            Err(PatientError::NotFound(id))
        }
    }

    /// Fetches a patient by id.
    pub fn get(&self, id: PatientId) -> PatientResult<Patient> {
        self.store.find(id)?.ok_or(PatientError::NotFound(id))
    }

    /// One page of all patients, ordered by full name.
    pub fn list(&self, request: &PageRequest) -> PatientResult<Page<Patient>> {
        request.validate()?;
        let patients = self.store.list_ordered_by_name()?;
        Ok(Page::slice(patients, request))
    }

    /// One page of the patients whose name contains `query`,
    /// case-insensitively, ordered by full name.
    pub fn search(&self, query: &str, request: &PageRequest) -> PatientResult<Page<Patient>> {
        request.validate()?;
        let needle = query.trim().to_lowercase();
        let matches: Vec<Patient> = self
            .store
            .list_ordered_by_name()?
            .into_iter()
            .filter(|patient| patient.full_name.as_str().to_lowercase().contains(&needle))
            .collect();
        Ok(Page::slice(matches, request))
    }

    /// The `limit` most recently registered patients, newest first.
    pub fn recent(&self, limit: usize) -> PatientResult<Vec<Patient>> {
        self.store.recent(limit)
    }
}
