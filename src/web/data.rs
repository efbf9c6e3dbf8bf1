//! The waitlist signup payload and its validated form live here, together
//! with the parsing implementations and their tests.

use lazy_regex::regex_is_match;
use serde::Deserialize;
use serde_json::Value;

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable waitlist signup payload.
/// Both fields arrive untyped: a missing or non-string email has to surface
/// as a validation error, not as a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaitlistPayload {
    pub email: Option<Value>,
    pub drone_type: Option<Value>,
}

impl WaitlistPayload {
    pub fn new(email: Option<Value>, drone_type: Option<Value>) -> Self {
        Self { email, drone_type }
    }
}

/// A waitlist entry with a validated, normalized email, ready to persist.
#[derive(Debug, Clone)]
pub struct ValidWaitlistEntry {
    pub email: ValidEmail,
    pub drone_type: Option<String>,
}

/// Validated waitlist email, lowercased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmail(String);

// ###################################
// ->   IMPLS
// ###################################
impl TryFrom<WaitlistPayload> for ValidWaitlistEntry {
    type Error = DataParsingError;

    fn try_from(payload: WaitlistPayload) -> Result<Self, Self::Error> {
        let email = payload
            .email
            .as_ref()
            .and_then(Value::as_str)
            .ok_or(DataParsingError::EmailMissing)?;
        let email = ValidEmail::parse(email)?;

        // Free text; anything that trims down to nothing is stored as absent.
        let drone_type = payload
            .drone_type
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|dt| !dt.is_empty())
            .map(str::to_owned);

        Ok(ValidWaitlistEntry { email, drone_type })
    }
}

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    /// Trims surrounding whitespace, checks the `local@domain.tld` shape and
    /// lowercases the result for storage.
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref().trim();

        if !regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", value) {
            return Err(DataParsingError::EmailInvalid);
        }

        Ok(ValidEmail(value.to_lowercase()))
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("email is missing or not a string")]
    EmailMissing,
    #[error("email format invalid")]
    EmailInvalid,
}
