//! # Pull Request Status Values
//!
//! A pull request references exactly one status record, whose value is drawn
//! from an open set of strings. Upstream processes may introduce new
//! non-terminal values; this crate only distinguishes [`StatusValue::MERGED`],
//! the single terminal (absorbing) value.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A pull request status value.
///
/// Comparison is exact and case-sensitive: `"merged"` is not terminal.
/// Deserialization goes through [`StatusValue::new`], so blank strings are
/// rejected there too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct StatusValue(Cow<'static, str>);

impl StatusValue {
    /// The status every pull request is created with.
    pub const OPEN: StatusValue = StatusValue(Cow::Borrowed("OPEN"));

    /// The terminal status. Once reached, a pull request never leaves it.
    pub const MERGED: StatusValue = StatusValue(Cow::Borrowed("MERGED"));

    /// Create a status value from arbitrary input, rejecting blank strings.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyStatus);
        }
        Ok(Self(Cow::Owned(value)))
    }

    /// Whether this is the terminal `MERGED` value.
    pub fn is_terminal(&self) -> bool {
        *self == Self::MERGED
    }

    /// The raw string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StatusValue {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StatusValue> for String {
    fn from(value: StatusValue) -> Self {
        value.0.into_owned()
    }
}

impl AsRef<str> for StatusValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
