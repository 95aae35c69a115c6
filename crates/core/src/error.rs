use crate::constants::PEDIATRIC_AGE_CEILING;
use crate::patient::{CityId, HospitalId, PatientId};
use std::collections::BTreeMap;

/// Per-field validation messages, keyed by field name.
///
/// Structural checks collect every failing field into one of these before
/// reporting, so a payload with three bad fields yields three entries rather
/// than just the first. The map is ordered for stable rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ValidationFailure {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationFailure {
    /// Creates an empty failure to collect messages into.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against a field.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Whether any messages have been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The messages recorded against `field`, if any.
    pub fn messages_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The full field-to-messages map.
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// `Ok(())` if nothing was recorded, otherwise a `Validation` error.
    pub(crate) fn into_result(self) -> PatientResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PatientError::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    /// Structural payload failures, one or more per field.
    #[error("patient payload failed validation: {0}")]
    Validation(ValidationFailure),
    /// The derived age is above the pediatric ceiling.
    #[error("derived age {age} exceeds the pediatric age ceiling")]
    AgeCeilingExceeded { age: u32 },
    /// Another patient already has this case-insensitive name and birth
    /// date. Carries the existing record's id so callers can link to it.
    #[error("a patient with the same name and birth date already exists (id {existing_id})")]
    DuplicatePatient { existing_id: PatientId },
    #[error("no patient found with id {0}")]
    NotFound(PatientId),
    #[error("city {0} does not exist")]
    UnknownCity(CityId),
    #[error("hospital {0} does not exist")]
    UnknownHospital(HospitalId),
    /// A collaborator-side storage failure, propagated untouched.
    #[error("storage backend error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PatientError {
    /// Renders the error in the same per-field shape as structural
    /// validation failures, so transports can present structural, business
    /// and reference failures uniformly.
    ///
    /// Returns `None` for errors that do not map to a payload field
    /// (`NotFound`, `Storage`).
    pub fn field_errors(&self) -> Option<ValidationFailure> {
        let mut failure = ValidationFailure::new();
        match self {
            PatientError::Validation(inner) => return Some(inner.clone()),
            PatientError::AgeCeilingExceeded { .. } => failure.push(
                "birth_date",
                format!("patient cannot be older than {PEDIATRIC_AGE_CEILING} years"),
            ),
            PatientError::DuplicatePatient { .. } => failure.push(
                "full_name",
                "a patient with this name and birth date already exists",
            ),
            PatientError::UnknownCity(_) => {
                failure.push("city_id", "the selected city does not exist");
            }
            PatientError::UnknownHospital(_) => {
                failure.push("hospital_id", "the selected hospital does not exist");
            }
            PatientError::NotFound(_) | PatientError::Storage(_) => return None,
        }
        Some(failure)
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
