/// Maximum length, in characters, of a person name (patient or tutor).
pub const MAX_PERSON_NAME_LEN: usize = 100;

/// Maximum length, in digits, of a normalized phone number.
pub const MAX_PHONE_LEN: usize = 20;

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input was empty, contained only whitespace, or (for phone
    /// numbers) contained no digits at all.
    #[error("cannot be empty")]
    Empty,
    /// The input exceeded the maximum permitted length.
    #[error("cannot be longer than {max} characters (got {len})")]
    TooLong { max: usize, len: usize },
}

/// A person name that is guaranteed non-empty and bounded in length.
///
/// This type wraps a `String` and ensures it contains at least one
/// non-whitespace character and at most [`MAX_PERSON_NAME_LEN`] characters.
/// The input is trimmed of leading and trailing whitespace during
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// Creates a new `PersonName` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. Returns
    /// `Err(TextError::Empty)` if the trimmed result is empty, or
    /// `Err(TextError::TooLong)` if it exceeds [`MAX_PERSON_NAME_LEN`]
    /// characters.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_PERSON_NAME_LEN {
            return Err(TextError::TooLong {
                max: MAX_PERSON_NAME_LEN,
                len,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for PersonName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PersonName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PersonName::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A phone number normalized to digits only.
///
/// Construction strips every non-digit character (separators, parentheses,
/// leading `+`) and requires the remainder to be non-empty and at most
/// [`MAX_PHONE_LEN`] digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Creates a new `PhoneNumber` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the input contains no digits, or
    /// `Err(TextError::TooLong)` if more than [`MAX_PHONE_LEN`] digits
    /// remain after normalization.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let digits: String = input
            .as_ref()
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return Err(TextError::Empty);
        }
        if digits.len() > MAX_PHONE_LEN {
            return Err(TextError::TooLong {
                max: MAX_PHONE_LEN,
                len: digits.len(),
            });
        }
        Ok(Self(digits))
    }

    /// Returns the normalized digits as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PhoneNumber::new(&s).map_err(serde::de::Error::custom)
    }
}
