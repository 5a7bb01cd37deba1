//! Minute-precision local datetime for edit fields.
//!
//! Date/time inputs bind a `YYYY-MM-DDTHH:MM` value in the facility's local
//! timezone. This module provides the type for that value, keeping it distinct
//! from the absolute instants held in persistence.

use chrono::{NaiveDateTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// Format string for the `datetime-local` input shape.
const EDIT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Error returned when parsing an invalid edit value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid edit datetime: {reason}")]
pub struct EditTimeError {
    reason: &'static str,
}

/// A timezone-local, minute-precision datetime as bound to a date/time input.
///
/// The stored value always has zero seconds and nanoseconds; construction
/// truncates. The textual form is `YYYY-MM-DDTHH:MM`.
///
/// # Examples
///
/// ```
/// use shipment_server::domain::EditDateTime;
///
/// let value = EditDateTime::parse("2024-03-15T14:30").unwrap();
/// assert_eq!(value.to_string(), "2024-03-15T14:30");
///
/// // Seconds are not part of the edit representation
/// assert!(EditDateTime::parse("2024-03-15T14:30:00").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditDateTime(NaiveDateTime);

impl EditDateTime {
    /// Create an edit value from a naive datetime, truncating to the minute.
    pub fn from_naive(naive: NaiveDateTime) -> Self {
        let truncated = naive
            .with_second(0)
            .and_then(|dt| dt.with_nanosecond(0))
            .unwrap_or(naive);
        EditDateTime(truncated)
    }

    /// Parse an edit value from the `YYYY-MM-DDTHH:MM` form.
    pub fn parse(s: &str) -> Result<Self, EditTimeError> {
        let naive = NaiveDateTime::parse_from_str(s, EDIT_FORMAT).map_err(|_| EditTimeError {
            reason: "expected YYYY-MM-DDTHH:MM",
        })?;
        Ok(EditDateTime(naive))
    }

    /// Parse an optional edit value: the empty string denotes an absent value.
    ///
    /// Absent is not an error condition; a cleared input round-trips to `None`.
    pub fn parse_opt(s: &str) -> Result<Option<Self>, EditTimeError> {
        if s.is_empty() {
            return Ok(None);
        }
        Self::parse(s).map(Some)
    }

    /// Returns the underlying naive datetime (seconds always zero).
    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl FromStr for EditDateTime {
    type Err = EditTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for EditDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EditDateTime({})", self.0.format(EDIT_FORMAT))
    }
}

impl fmt::Display for EditDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(EDIT_FORMAT))
    }
}
