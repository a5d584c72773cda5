use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::time::Clock;

/// Unique identifier for a Capsule.
///
/// Ids are opaque strings. Freshly generated ids take the form
/// `<prefix>-<base36 millis>-<6 random chars>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapsuleId(String);

impl CapsuleId {
    /// Wraps an existing id.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the value is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generates a fresh `capsule-…` id.
    #[must_use]
    pub fn generate(clock: &Clock) -> Self {
        Self::generate_with_prefix("capsule", clock)
    }

    fn generate_with_prefix(prefix: &str, clock: &Clock) -> Self {
        let millis = u64::try_from(clock.now_millis()).unwrap_or_default();
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("{prefix}-{}-{}", to_base36(millis), &random[..6]))
    }

    /// Id given to imported documents that arrive without one.
    ///
    /// Carries the same random suffix as [`CapsuleId::generate`], so two
    /// imports in the same millisecond still differ.
    #[must_use]
    pub fn for_import(clock: &Clock) -> Self {
        Self::generate_with_prefix("imp", clock)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

impl AsRef<str> for CapsuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CapsuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapsuleId({})", self.0)
    }
}

impl fmt::Display for CapsuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for parsing a `CapsuleId` from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError;

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("capsule id cannot be empty")
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for CapsuleId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
