//! In-memory collaborators.
//!
//! `MemoryStore` and `MemoryDirectory` back the test suite and embedding
//! callers that do not bring a database. Both are single-threaded by
//! construction, so the check-then-write atomicity expected by
//! [`PatientStore`](crate::store::PatientStore) holds trivially.

use crate::error::{PatientError, PatientResult};
use crate::patient::{CityId, HospitalId, Patient, PatientId};
use crate::store::{PatientStore, ReferenceDirectory};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Map-backed patient store with sequential id allocation.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    patients: BTreeMap<PatientId, Patient>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            patients: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Number of stored patients.
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientStore for MemoryStore {
    fn find(&self, id: PatientId) -> PatientResult<Option<Patient>> {
        Ok(self.patients.get(&id).cloned())
    }

    fn find_by_name_and_birth_date(
        &self,
        full_name: &str,
        birth_date: NaiveDate,
    ) -> PatientResult<Vec<Patient>> {
        let needle = full_name.to_lowercase();
        Ok(self
            .patients
            .values()
            .filter(|p| {
                p.birth_date == birth_date && p.full_name.as_str().to_lowercase() == needle
            })
            .cloned()
            .collect())
    }

    fn list_ordered_by_name(&self) -> PatientResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = self.patients.values().cloned().collect();
        patients.sort_by(|a, b| {
            a.full_name
                .as_str()
                .to_lowercase()
                .cmp(&b.full_name.as_str().to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(patients)
    }

    fn recent(&self, limit: usize) -> PatientResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = self.patients.values().cloned().collect();
        patients.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        patients.truncate(limit);
        Ok(patients)
    }

    fn allocate_id(&mut self) -> PatientResult<PatientId> {
        let id = PatientId(self.next_id);
        self.next_id += 1;
        Ok(id)
    }

    fn insert(&mut self, patient: Patient) -> PatientResult<()> {
        self.patients.insert(patient.id, patient);
        Ok(())
    }

    fn update(&mut self, patient: &Patient) -> PatientResult<()> {
        match self.patients.get_mut(&patient.id) {
            Some(slot) => {
                *slot = patient.clone();
                Ok(())
            }
            None => Err(PatientError::NotFound(patient.id)),
        }
    }

    fn delete(&mut self, id: PatientId) -> PatientResult<bool> {
        Ok(self.patients.remove(&id).is_some())
    }
}

/// Set-backed city/hospital directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    cities: BTreeSet<CityId>,
    hospitals: BTreeSet<HospitalId>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, id: CityId) -> Self {
        self.cities.insert(id);
        self
    }

    pub fn with_hospital(mut self, id: HospitalId) -> Self {
        self.hospitals.insert(id);
        self
    }

    pub fn add_city(&mut self, id: CityId) {
        self.cities.insert(id);
    }

    pub fn add_hospital(&mut self, id: HospitalId) {
        self.hospitals.insert(id);
    }
}

impl ReferenceDirectory for MemoryDirectory {
    fn city_exists(&self, id: CityId) -> PatientResult<bool> {
        Ok(self.cities.contains(&id))
    }

    fn hospital_exists(&self, id: HospitalId) -> PatientResult<bool> {
        Ok(self.hospitals.contains(&id))
    }
}
