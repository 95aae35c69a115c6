//! Patient domain model and identifiers.
//!
//! Responsibilities:
//! - Define the persisted `Patient` record and its wire representation
//! - Define the gender enumeration with its persisted spellings
//! - Provide presentation helpers (formatted name, detailed age)
//!
//! Invariants on every persisted record are enforced upstream by the
//! validator and lifecycle manager: `age` matches the birth date as of the
//! last write touching it and never exceeds the pediatric ceiling, the birth
//! date precedes the registration date, and no two records share the same
//! case-insensitive name and birth date.

use chrono::{DateTime, NaiveDate, Utc};
use pedreg_types::{PersonName, PhoneNumber};
use serde::{Deserialize, Serialize};

/// Stable patient identity, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub u64);

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a city record owned by an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub u64);

impl std::fmt::Display for CityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a hospital record owned by an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HospitalId(pub u64);

impl std::fmt::Display for HospitalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Patient gender. The spellings are the persisted domain values and the
/// wire format; they are not translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Masculino,
    Femenino,
    Otro,
}

impl Gender {
    /// Every accepted value, in presentation order.
    pub const ALL: [Gender; 3] = [Gender::Masculino, Gender::Femenino, Gender::Otro];

    /// The persisted spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Masculino => "Masculino",
            Gender::Femenino => "Femenino",
            Gender::Otro => "Otro",
        }
    }

    /// Parse the persisted spelling. Matching is exact; unknown values are
    /// a structural validation failure at the boundary.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Masculino" => Some(Gender::Masculino),
            "Femenino" => Some(Gender::Femenino),
            "Otro" => Some(Gender::Otro),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub full_name: PersonName,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    /// Derived from `birth_date`; recomputed whenever the birth date is
    /// written, never accepted from a payload.
    pub age: u8,
    pub city_id: CityId,
    pub hospital_id: HospitalId,
    pub tutor_name: PersonName,
    pub tutor_phone: PhoneNumber,
    /// Set to "today" at creation; never altered by updates.
    pub registration_date: NaiveDate,
    /// Creation timestamp; drives the "recent registrations" read path.
    pub created_at: DateTime<Utc>,
}

impl Patient {
    /// Title-cased rendering of the lowercased full name, e.g.
    /// `"ana LOPEZ"` becomes `"Ana Lopez"`.
    pub fn formatted_name(&self) -> String {
        let lower = self.full_name.as_str().to_lowercase();
        let mut out = String::with_capacity(lower.len());
        let mut at_word_start = true;
        for ch in lower.chars() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            at_word_start = ch.is_whitespace();
        }
        out
    }

    /// Detailed age as `"{years}a {months}m"` relative to `reference_date`.
    pub fn detailed_age(&self, reference_date: NaiveDate) -> String {
        crate::age::detailed_age(self.birth_date, reference_date)
    }
}
