//! Backup date rendering.
//!
//! Dates arrive as whatever string the caller has on hand: an RFC 3339 stamp
//! from an API, an RFC 2822 header, or the file stamp the receiver puts in a
//! backup's file name. Rendering is best effort; anything that cannot be parsed
//! or rendered is displayed as it was given.

use core::fmt::{self, Write};

use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
    format::{Item, StrftimeItems},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// The default display pattern, renders as `1/15/2024, 10:30:00 AM`.
pub const DEFAULT_PATTERN: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// The UTC stamp the receiver names backup files with.
pub const FILE_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Date times without an offset, tried in order.
const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats a backup date for display using the default [`DateFormat`].
///
/// Never fails: if `input` cannot be parsed or rendered it is returned unchanged.
pub fn format_backup_date(input: &str) -> String {
    DateFormat::default().format(input)
}

/// The time zone dates are displayed in.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayTimezone {
    /// The host's local time zone.
    #[default]
    Local,

    /// Coordinated universal time.
    Utc,
}

impl DisplayTimezone {
    /// Resolves a wall clock time in this time zone to an instant.
    fn resolve(self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Self::Local => resolve_wall_clock(&Local, naive),
            Self::Utc => Some(Utc.from_utc_datetime(&naive)),
        }
    }
}

/// Resolves a wall clock time in `timezone`.
///
/// A time repeated when clocks go back takes the earlier instant. A time
/// skipped when clocks go forward is moved forward an hour, past the gap.
fn resolve_wall_clock<Tz: TimeZone>(
    timezone: &Tz,
    naive: NaiveDateTime,
) -> Option<DateTime<Utc>> {
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            let shifted = naive.checked_add_signed(TimeDelta::hours(1))?;
            timezone.from_local_datetime(&shifted).earliest()
        })
        .map(|date| date.with_timezone(&Utc))
}

/// How backup dates are rendered.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DateFormat {
    /// A `strftime` style pattern.
    pub pattern: String,

    /// The time zone to render in, naive inputs are also read in this zone.
    pub timezone: DisplayTimezone,
}

impl DateFormat {
    /// Creates a new date format.
    pub fn new(pattern: impl Into<String>, timezone: DisplayTimezone) -> Self {
        Self {
            pattern: pattern.into(),
            timezone,
        }
    }

    /// Formats `input` for display, falling back to `input` itself on any failure.
    pub fn format(&self, input: &str) -> String {
        match self.try_format(input) {
            Ok(formatted) => formatted,
            Err(error) => {
                debug!("Displaying date unformatted: {error}");
                input.to_string()
            }
        }
    }

    /// Tries to parse and render `input`.
    pub fn try_format(&self, input: &str) -> Result<String, FormatDateError> {
        let items = self.items()?;
        let date = parse_backup_date(input, self.timezone)?;

        match self.timezone {
            DisplayTimezone::Local => render(&date.with_timezone(&Local), &items),
            DisplayTimezone::Utc => render(&date, &items),
        }
    }

    /// The parsed pattern, rejected if empty or if any item is not understood.
    fn items(&self) -> Result<Vec<Item<'_>>, FormatDateError> {
        let items: Vec<Item<'_>> = StrftimeItems::new(&self.pattern).collect();

        if items.is_empty() || items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(FormatDateError::InvalidPattern(self.pattern.clone()));
        }

        Ok(items)
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN, DisplayTimezone::default())
    }
}

/// Parses a backup date string to an instant.
///
/// Date times without an offset, and bare dates (at midnight), are read in
/// `timezone`. File stamps are always UTC.
pub fn parse_backup_date(
    input: &str,
    timezone: DisplayTimezone,
) -> Result<DateTime<Utc>, FormatDateError> {
    parse_with(input, |naive| timezone.resolve(naive))
}

/// Parses `input`, resolving any wall clock time with `resolve`.
fn parse_with<Resolve>(input: &str, resolve: Resolve) -> Result<DateTime<Utc>, FormatDateError>
where
    Resolve: FnOnce(NaiveDateTime) -> Option<DateTime<Utc>>,
{
    let trimmed = input.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(date.with_timezone(&Utc));
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(date.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, FILE_STAMP_FORMAT) {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    let naive = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| FormatDateError::Unrecognised(input.to_string()))?;

    resolve(naive).ok_or_else(|| FormatDateError::UnresolvableLocalTime(input.to_string()))
}

fn render<Tz: TimeZone>(
    date: &DateTime<Tz>,
    items: &[Item<'_>],
) -> Result<String, FormatDateError>
where
    Tz::Offset: fmt::Display,
{
    let mut output = String::new();
    write!(output, "{}", date.format_with_items(items.iter()))
        .map_err(FormatDateError::Render)?;

    Ok(output)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum FormatDateError {
    #[error("'{0}' is not a recognised date")]
    Unrecognised(String),

    #[error("'{0}' does not resolve to a local time")]
    UnresolvableLocalTime(String),

    #[error("Invalid date pattern '{0}'")]
    InvalidPattern(String),

    #[error("Failed to render date: {0}")]
    Render(#[source] fmt::Error),
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, LocalResult};

    use super::*;

    /// A zone that changes from `before` to `after` at the UTC time `at`.
    #[derive(Clone, Copy, Debug)]
    struct Shift {
        before: FixedOffset,
        after: FixedOffset,
        at: NaiveDateTime,
    }

    impl Shift {
        fn new(before_hours: i32, after_hours: i32, at: &str) -> Self {
            Self {
                before: FixedOffset::east_opt(before_hours * 3600).unwrap(),
                after: FixedOffset::east_opt(after_hours * 3600).unwrap(),
                at: naive(at),
            }
        }

        fn offset_at(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < self.at {
                self.before
            } else {
                self.after
            }
        }
    }

    impl TimeZone for Shift {
        type Offset = FixedOffset;

        fn from_offset(offset: &FixedOffset) -> Self {
            Self {
                before: *offset,
                after: *offset,
                at: NaiveDateTime::MIN,
            }
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let mut valid: Vec<(NaiveDateTime, FixedOffset)> = [self.before, self.after]
                .into_iter()
                .filter_map(|offset| {
                    let utc = *local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
                    (self.offset_at(&utc) == offset).then_some((utc, offset))
                })
                .collect();
            valid.sort_by_key(|(utc, _)| *utc);
            valid.dedup();

            match valid.as_slice() {
                [] => LocalResult::None,
                [(_, offset)] => LocalResult::Single(*offset),
                [(_, first), (_, second), ..] => LocalResult::Ambiguous(*first, *second),
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_at(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            self.offset_at(utc)
        }
    }

    fn naive(input: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M").unwrap()
    }

    fn utc(input: &str) -> DateTime<Utc> {
        Utc.from_utc_datetime(&naive(input))
    }

    #[test]
    fn utc_resolves_wall_clock_unchanged() {
        let naive = naive("2024-01-15 10:30");

        let resolved = DisplayTimezone::Utc.resolve(naive).unwrap();
        assert_eq!(resolved.naive_utc(), naive);
    }

    #[test]
    fn repeated_time_takes_earlier_instant() {
        // New York, clocks go back from 02:00 EDT to 01:00 EST.
        let zone = Shift::new(-4, -5, "2024-11-03 06:00");

        assert_eq!(
            resolve_wall_clock(&zone, naive("2024-11-03 01:30")),
            Some(utc("2024-11-03 05:30"))
        );
    }

    #[test]
    fn skipped_time_moves_past_gap() {
        // New York, clocks go forward from 02:00 EST to 03:00 EDT.
        let zone = Shift::new(-5, -4, "2024-03-10 07:00");

        assert_eq!(
            resolve_wall_clock(&zone, naive("2024-03-10 02:30")),
            Some(utc("2024-03-10 07:30"))
        );
    }

    #[test]
    fn unaffected_time_resolves_once() {
        let zone = Shift::new(-5, -4, "2024-03-10 07:00");

        assert_eq!(
            resolve_wall_clock(&zone, naive("2024-03-09 12:00")),
            Some(utc("2024-03-09 17:00"))
        );
    }

    #[test]
    fn bare_date_with_skipped_midnight() {
        // Midnight jumps straight to 01:00.
        let zone = Shift::new(-3, -2, "2024-03-10 03:00");

        let date = parse_with("2024-03-10", |naive| resolve_wall_clock(&zone, naive)).unwrap();
        assert_eq!(date, utc("2024-03-10 03:00"));
    }

    #[test]
    fn time_inside_long_gap_is_unresolvable() {
        // A two hour gap, 02:00 to 04:00, an hour forward is still inside it.
        let zone = Shift::new(0, 2, "2024-03-10 02:00");

        let result = parse_with("2024-03-10 02:15", |naive| resolve_wall_clock(&zone, naive));
        assert!(matches!(
            result,
            Err(FormatDateError::UnresolvableLocalTime(input)) if input == "2024-03-10 02:15"
        ));
    }

    #[test]
    fn empty_pattern_is_invalid() {
        let format = DateFormat::new("", DisplayTimezone::Utc);
        assert!(matches!(
            format.items(),
            Err(FormatDateError::InvalidPattern(_))
        ));
    }

    #[test]
    fn unknown_specifier_is_invalid() {
        let format = DateFormat::new("%Y-%Q", DisplayTimezone::Utc);
        assert!(matches!(
            format.items(),
            Err(FormatDateError::InvalidPattern(pattern)) if pattern == "%Y-%Q"
        ));
    }
}
