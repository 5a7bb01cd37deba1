//! Conversion between stored, edit, and display datetime representations.
//!
//! A stop timestamp exists in three forms that must stay consistent:
//!
//! - **Stored**: an absolute instant (`DateTime<Utc>`), used for persistence
//!   and transport.
//! - **Edit**: a facility-local, minute-precision [`EditDateTime`] bound to a
//!   date/time input.
//! - **Display**: a facility-local human-readable string, used in viewing
//!   mode.
//!
//! `to_stored(to_edit(x, tz), tz)` equals `x` truncated to the minute for any
//! instant whose local rendering is unambiguous in `tz`. A local time made
//! ambiguous by a DST fall-back resolves to the earlier instant; a local time
//! that falls in a DST gap is nudged forward past the transition. An absent
//! instant maps to an absent edit value and back; that is not an error.
//!
//! When no timezone can be resolved for a stop, conversion treats the instant
//! as already local (no offset applied). Display output is then best effort
//! and carries no zone abbreviation, which is the caller's cue to indicate
//! reduced confidence.

use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::domain::EditDateTime;

/// Truncate an instant to minute precision.
pub fn truncate_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(instant)
}

/// Convert a stored instant to its edit representation in `tz`.
///
/// With no timezone the instant's UTC wall time is used unchanged.
pub fn to_edit(instant: Option<DateTime<Utc>>, tz: Option<Tz>) -> Option<EditDateTime> {
    let instant = instant?;
    let naive = match tz {
        Some(tz) => instant.with_timezone(&tz).naive_local(),
        None => instant.naive_utc(),
    };
    Some(EditDateTime::from_naive(naive))
}

/// Convert an edit value back to a stored instant, interpreting it in `tz`.
///
/// With no timezone the edit value is taken as UTC wall time, mirroring
/// [`to_edit`] so the fallback still round-trips.
pub fn to_stored(edit: Option<EditDateTime>, tz: Option<Tz>) -> Option<DateTime<Utc>> {
    let naive = edit?.naive();
    let tz = match tz {
        Some(tz) => tz,
        None => return Some(Utc.from_utc_datetime(&naive)),
    };

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Some(earlier.with_timezone(&Utc)),
        LocalResult::None => {
            // The local time fell in a DST spring-forward gap. Such a value
            // cannot come out of to_edit; an operator typed it. Interpret it
            // as the same wall-clock offset after the transition.
            let shifted = naive + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// Render an edit value for viewing mode.
///
/// With a timezone the output carries the zone abbreviation
/// (`2024-03-15 14:30 CDT`); without one it is the bare local wall time.
pub fn to_display(edit: Option<EditDateTime>, tz: Option<Tz>) -> Option<String> {
    let naive = edit?.naive();
    match tz {
        Some(tz) => {
            let local = tz.from_local_datetime(&naive).earliest()?;
            Some(local.format("%Y-%m-%d %H:%M %Z").to_string())
        }
        None => Some(naive.format("%Y-%m-%d %H:%M").to_string()),
    }
}
