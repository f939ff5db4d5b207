use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A countdown length in whole minutes, always within
/// [`DurationMinutes::MIN`]..=[`DurationMinutes::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DurationMinutes(u32);

impl DurationMinutes {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 999;

    pub fn new(minutes: u32) -> Result<Self, ValidationError> {
        Self::check(i64::from(minutes))
    }

    /// Parse free-form user input such as `" 25 "`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let value: i64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
            input: trimmed.to_string(),
            min: Self::MIN,
            max: Self::MAX,
        })?;
        Self::check(value)
    }

    fn check(minutes: i64) -> Result<Self, ValidationError> {
        if minutes < i64::from(Self::MIN) || minutes > i64::from(Self::MAX) {
            return Err(ValidationError::DurationOutOfRange {
                minutes,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        // In range, so the cast cannot truncate.
        Ok(Self(minutes as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_secs(self) -> u64 {
        u64::from(self.0) * 60
    }
}

impl TryFrom<u32> for DurationMinutes {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DurationMinutes> for u32 {
    fn from(value: DurationMinutes) -> Self {
        value.0
    }
}

impl FromStr for DurationMinutes {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DurationMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}
