//! Duplicate patient detection.
//!
//! Two records are duplicates when they share the same case-insensitive
//! full name and the same calendar birth date. On the update path the record
//! being updated is excluded, so a patient never matches itself.

use crate::error::PatientResult;
use crate::patient::PatientId;
use crate::store::PatientStore;
use chrono::NaiveDate;

/// Read-only duplicate lookup over a patient store. Safe to call repeatedly
/// within a single validation pass.
pub struct DuplicateDetector<'a, S> {
    store: &'a S,
}

impl<'a, S: PatientStore> DuplicateDetector<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns the id of an existing patient with the same case-insensitive
    /// `full_name` and exact `birth_date`, skipping `exclude` so an update
    /// never reports the record it is updating.
    pub fn find_duplicate(
        &self,
        full_name: &str,
        birth_date: NaiveDate,
        exclude: Option<PatientId>,
    ) -> PatientResult<Option<PatientId>> {
        let matches = self
            .store
            .find_by_name_and_birth_date(full_name, birth_date)?;
        Ok(matches
            .into_iter()
            .map(|patient| patient.id)
            .find(|id| Some(*id) != exclude))
    }

    /// Boolean form of [`find_duplicate`](Self::find_duplicate).
    pub fn exists_duplicate(
        &self,
        full_name: &str,
        birth_date: NaiveDate,
        exclude: Option<PatientId>,
    ) -> PatientResult<bool> {
        Ok(self.find_duplicate(full_name, birth_date, exclude)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::patient::{CityId, Gender, HospitalId, Patient};
    use chrono::NaiveTime;
    use pedreg_types::{PersonName, PhoneNumber};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn store_with(name: &str, birth: NaiveDate) -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .insert(Patient {
                id: PatientId(1),
                full_name: PersonName::new(name).unwrap(),
                gender: Gender::Femenino,
                birth_date: birth,
                age: 5,
                city_id: CityId(1),
                hospital_id: HospitalId(1),
                tutor_name: PersonName::new("Tutor").unwrap(),
                tutor_phone: PhoneNumber::new("12345").unwrap(),
                registration_date: date(2025, 1, 1),
                created_at: date(2025, 1, 1).and_time(NaiveTime::MIN).and_utc(),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_detection_agrees_across_name_casing() {
        let birth = date(2020, 3, 14);
        let store = store_with("Ana Lopez", birth);
        let detector = DuplicateDetector::new(&store);

        assert!(detector.exists_duplicate("ana lopez", birth, None).unwrap());
        assert!(detector.exists_duplicate("ANA LOPEZ", birth, None).unwrap());
        assert_eq!(
            detector.find_duplicate("Ana Lopez", birth, None).unwrap(),
            Some(PatientId(1))
        );
    }

    #[test]
    fn test_date_match_is_exact() {
        let store = store_with("Ana Lopez", date(2020, 3, 14));
        let detector = DuplicateDetector::new(&store);
        assert!(!detector
            .exists_duplicate("Ana Lopez", date(2020, 3, 15), None)
            .unwrap());
    }

    #[test]
    fn test_exclude_skips_the_record_itself() {
        let birth = date(2020, 3, 14);
        let store = store_with("Ana Lopez", birth);
        let detector = DuplicateDetector::new(&store);

        assert!(!detector
            .exists_duplicate("Ana Lopez", birth, Some(PatientId(1)))
            .unwrap());
        assert!(detector
            .exists_duplicate("Ana Lopez", birth, Some(PatientId(2)))
            .unwrap());
    }
}
