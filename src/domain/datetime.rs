// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar types stored in configuration parameters.
//!
//! `Date`, `Time` and `DateTime` mirror the TOML date/time model: years are
//! limited to `0000..=9999`, times may carry a leap second (`23:59:60`) and
//! UTC offsets are whole minutes. They are thin wrappers around the `chrono`
//! types, so every value that exists has passed validation. Values parse from
//! and format to their RFC 3339 representation.

use crate::domain::errors::{ConfigError, Result};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Timelike};
use std::fmt;
use std::str::FromStr;

/// Largest year representable in RFC 3339.
pub const MAX_YEAR: u32 = 9999;

const NANOS_PER_SECOND: u32 = 1_000_000_000;

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dt%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// A calendar date without time zone.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::datetime::Date;
///
/// let date: Date = "2022-12-01".parse().unwrap();
/// assert_eq!(date, Date::new(2022, 12, 1).unwrap());
/// assert_eq!(date.month(), 12);
/// assert_eq!(date.to_string(), "2022-12-01");
/// assert!(Date::new(2021, 2, 29).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a validated date.
    ///
    /// # Errors
    ///
    /// `ValueError` if the year exceeds [`MAX_YEAR`] or the day does not
    /// exist in that month.
    pub fn new(year: u32, month: u32, day: u32) -> Result<Self> {
        i32::try_from(year)
            .ok()
            .filter(|_| year <= MAX_YEAR)
            .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
            .map(Date)
            .ok_or_else(|| {
                ConfigError::value_error(format!(
                    "Invalid date {:04}-{:02}-{:02}!",
                    year, month, day
                ))
            })
    }

    /// Year (`0..=9999`).
    pub fn year(&self) -> u32 {
        self.0.year().unsigned_abs()
    }

    /// Month (`1..=12`).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of month.
    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

/// A time of day with nanosecond resolution.
///
/// ```
/// use cfgtree::domain::datetime::Time;
///
/// let time: Time = "08:30:00.25".parse().unwrap();
/// assert_eq!(time.nanosecond(), 250_000_000);
/// assert_eq!(time.to_string(), "08:30:00.25");
/// assert_eq!("07:30".parse::<Time>().unwrap().to_string(), "07:30:00");
/// assert_eq!("23:59:60".parse::<Time>().unwrap().second(), 60);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(NaiveTime);

impl Time {
    /// Creates a validated time of day.
    ///
    /// `second` may be `60` to denote a leap second.
    ///
    /// # Errors
    ///
    /// `ValueError` if any component is out of range.
    pub fn new(hour: u32, minute: u32, second: u32, nanosecond: u32) -> Result<Self> {
        let naive = match (second, nanosecond) {
            (_, ns) if ns >= NANOS_PER_SECOND => None,
            // chrono keeps a leap second as second 59 with an overflowing fraction.
            (60, ns) => NaiveTime::from_hms_nano_opt(hour, minute, 59, ns + NANOS_PER_SECOND),
            (s, ns) => NaiveTime::from_hms_nano_opt(hour, minute, s, ns),
        };
        naive.map(Time).ok_or_else(|| {
            ConfigError::value_error(format!(
                "Invalid time {:02}:{:02}:{:02}.{:09}!",
                hour, minute, second, nanosecond
            ))
        })
    }

    /// Hour (`0..=23`).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Minute (`0..=59`).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Second (`0..=60`, `60` for a leap second).
    pub fn second(&self) -> u32 {
        if self.0.nanosecond() >= NANOS_PER_SECOND {
            60
        } else {
            self.0.second()
        }
    }

    /// Fraction of the second in nanoseconds (`0..=999_999_999`).
    pub fn nanosecond(&self) -> u32 {
        self.0.nanosecond() % NANOS_PER_SECOND
    }
}

/// Offset from UTC in whole minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeOffset(FixedOffset);

impl TimeOffset {
    /// Creates a validated offset (strictly within one day).
    pub fn new(minutes: i32) -> Result<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(TimeOffset)
            .ok_or_else(|| {
                ConfigError::value_error(format!("Invalid UTC offset of {} minutes!", minutes))
            })
    }

    /// The zero offset (`Z`).
    pub fn utc() -> Self {
        TimeOffset(chrono::Utc.fix())
    }

    /// Signed offset in minutes, e.g. `-420` for `-07:00`.
    pub fn minutes(&self) -> i32 {
        self.0.local_minus_utc() / 60
    }
}

/// A date and time, optionally anchored to a UTC offset.
///
/// Without an offset the value denotes a local date-time.
///
/// ```
/// use cfgtree::domain::datetime::DateTime;
///
/// let dt: DateTime = "1979-05-27T00:32:00.999999-07:00".parse().unwrap();
/// assert_eq!(dt.offset().unwrap().minutes(), -420);
/// assert_eq!(dt.to_string(), "1979-05-27T00:32:00.999999-07:00");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateTime {
    date: Date,
    time: Time,
    offset: Option<TimeOffset>,
}

impl DateTime {
    /// Creates a date-time from already validated parts.
    pub fn new(date: Date, time: Time, offset: Option<TimeOffset>) -> Self {
        Self { date, time, offset }
    }

    /// Creates a local date-time.
    pub fn local(date: Date, time: Time) -> Self {
        Self::new(date, time, None)
    }

    /// Creates a date-time with a UTC offset.
    pub fn with_offset(date: Date, time: Time, offset: TimeOffset) -> Self {
        Self::new(date, time, Some(offset))
    }

    /// The calendar date.
    pub fn date(&self) -> Date {
        self.date
    }

    /// The time of day.
    pub fn time(&self) -> Time {
        self.time
    }

    /// Offset from UTC, `None` for local date-times.
    pub fn offset(&self) -> Option<TimeOffset> {
        self.offset
    }

    /// Returns `true` if no UTC offset is attached.
    pub fn is_local(&self) -> bool {
        self.offset.is_none()
    }
}

impl FromStr for Date {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        // `%Y` alone would also take years with fewer than four digits.
        let parsed = if trimmed.len() == 10 {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
        } else {
            None
        };
        parsed
            .ok_or_else(|| {
                ConfigError::value_error(format!(
                    "Cannot parse `{}` as date, expected `YYYY-MM-DD`!",
                    s
                ))
            })
            .and_then(Date::try_from)
    }
}

impl FromStr for Time {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
            .map(Time)
            .ok_or_else(|| {
                ConfigError::value_error(format!(
                    "Cannot parse `{}` as time, expected `HH:MM[:SS[.fraction]]`!",
                    s
                ))
            })
    }
}

impl FromStr for DateTime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
            return DateTime::try_from(dt);
        }
        LOCAL_DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
            .ok_or_else(|| {
                ConfigError::value_error(format!(
                    "Cannot parse `{}` as date-time, expected RFC 3339!",
                    s
                ))
            })
            .and_then(DateTime::try_from)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour(), self.minute(), self.second())?;
        if self.nanosecond() > 0 {
            let fraction = format!("{:09}", self.nanosecond());
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.minutes();
        if minutes == 0 {
            return write!(f, "Z");
        }
        let sign = if minutes < 0 { '-' } else { '+' };
        let abs = minutes.unsigned_abs();
        write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)?;
        if let Some(offset) = self.offset {
            write!(f, "{}", offset)?;
        }
        Ok(())
    }
}

// Conversions to and from chrono's calendar types.

impl TryFrom<NaiveDate> for Date {
    type Error = ConfigError;

    fn try_from(d: NaiveDate) -> Result<Self> {
        match u32::try_from(d.year()) {
            Ok(year) if year <= MAX_YEAR => Ok(Date(d)),
            _ => Err(ConfigError::value_error(format!(
                "Year {} is outside of 0000..=9999!",
                d.year()
            ))),
        }
    }
}

impl From<Date> for NaiveDate {
    fn from(d: Date) -> Self {
        d.0
    }
}

impl From<NaiveTime> for Time {
    fn from(t: NaiveTime) -> Self {
        Time(t)
    }
}

impl From<Time> for NaiveTime {
    fn from(t: Time) -> Self {
        t.0
    }
}

impl TryFrom<FixedOffset> for TimeOffset {
    type Error = ConfigError;

    fn try_from(o: FixedOffset) -> Result<Self> {
        if o.local_minus_utc() % 60 != 0 {
            return Err(ConfigError::value_error(format!(
                "UTC offset {} is not a whole number of minutes!",
                o
            )));
        }
        Ok(TimeOffset(o))
    }
}

impl From<TimeOffset> for FixedOffset {
    fn from(o: TimeOffset) -> Self {
        o.0
    }
}

impl TryFrom<NaiveDateTime> for DateTime {
    type Error = ConfigError;

    fn try_from(dt: NaiveDateTime) -> Result<Self> {
        Ok(DateTime::local(dt.date().try_into()?, dt.time().into()))
    }
}

impl TryFrom<chrono::DateTime<FixedOffset>> for DateTime {
    type Error = ConfigError;

    fn try_from(dt: chrono::DateTime<FixedOffset>) -> Result<Self> {
        let offset = TimeOffset::try_from(*dt.offset())?;
        let local = DateTime::try_from(dt.naive_local())?;
        Ok(DateTime::with_offset(local.date, local.time, offset))
    }
}

impl From<DateTime> for NaiveDateTime {
    fn from(dt: DateTime) -> Self {
        NaiveDateTime::new(dt.date.into(), dt.time.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_parse_and_display() {
        let date: Date = "2020-02-29".parse().unwrap();
        assert_eq!(date, Date::new(2020, 2, 29).unwrap());
        assert_eq!(date.to_string(), "2020-02-29");
        assert_eq!(Date::new(7, 1, 2).unwrap().to_string(), "0007-01-02");
    }

    #[test]
    fn test_date_invalid() {
        for s in ["2021-02-29", "2021-13-01", "2021-00-10", "21-01-01", "2021/01/01", "abcd-ef-gh", ""] {
            let result = s.parse::<Date>();
            assert!(
                matches!(result, Err(ConfigError::ValueError { .. })),
                "Expected ValueError for `{}`",
                s
            );
        }
    }

    #[test]
    fn test_date_range() {
        assert_eq!(Date::new(9999, 12, 31).unwrap().year(), 9999);
        assert!(Date::new(10_000, 1, 1).unwrap_err().is_value_error());
        assert!(Date::new(70_000, 13, 40).unwrap_err().is_value_error());
        assert!(Date::new(u32::MAX, 1, 1).unwrap_err().is_value_error());

        let far = NaiveDate::from_ymd_opt(12_000, 1, 1).unwrap();
        assert!(Date::try_from(far).unwrap_err().is_value_error());
        let negative = NaiveDate::from_ymd_opt(-1, 1, 1).unwrap();
        assert!(Date::try_from(negative).is_err());
    }

    #[test]
    fn test_time_parse() {
        assert_eq!("08:30:00".parse::<Time>().unwrap(), Time::new(8, 30, 0, 0).unwrap());
        assert_eq!(
            "23:59:59.123456789".parse::<Time>().unwrap(),
            Time::new(23, 59, 59, 123_456_789).unwrap()
        );
        assert_eq!("10:08".parse::<Time>().unwrap(), Time::new(10, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_time_invalid() {
        for s in ["24:00:00", "12:60:00", "noon", ""] {
            assert!(s.parse::<Time>().is_err(), "Expected error for `{}`", s);
        }
        assert!(Time::new(300, 0, 0, 0).unwrap_err().is_value_error());
        assert!(Time::new(12, 0, 61, 0).is_err());
        assert!(Time::new(12, 0, 0, 1_000_000_000).is_err());
    }

    #[test]
    fn test_leap_second() {
        let leap = Time::new(23, 59, 60, 500_000_000).unwrap();
        assert_eq!(leap.second(), 60);
        assert_eq!(leap.nanosecond(), 500_000_000);
        assert_eq!(leap.to_string(), "23:59:60.5");
        assert_eq!("23:59:60.5".parse::<Time>().unwrap(), leap);
        assert!(leap > Time::new(23, 59, 59, 999_999_999).unwrap());
    }

    #[test]
    fn test_time_display_trims_fraction() {
        let time = Time::new(7, 5, 3, 500_000_000).unwrap();
        assert_eq!(time.to_string(), "07:05:03.5");
    }

    #[test]
    fn test_datetime_local() {
        let dt: DateTime = "2022-12-01T08:30:00".parse().unwrap();
        assert!(dt.is_local());
        assert_eq!(dt.to_string(), "2022-12-01T08:30:00");

        let spaced: DateTime = "2022-12-01 08:30:00".parse().unwrap();
        assert_eq!(spaced, dt);
    }

    #[test]
    fn test_datetime_offsets() {
        let utc: DateTime = "2022-12-01T08:30:00Z".parse().unwrap();
        assert_eq!(utc.offset(), Some(TimeOffset::utc()));
        assert_eq!(utc.to_string(), "2022-12-01T08:30:00Z");

        let east: DateTime = "2022-12-01T08:30:00+05:30".parse().unwrap();
        assert_eq!(east.offset().unwrap().minutes(), 330);
        assert_eq!(east.date(), Date::new(2022, 12, 1).unwrap());
        assert_eq!(east.time(), Time::new(8, 30, 0, 0).unwrap());
    }

    #[test]
    fn test_datetime_invalid() {
        for s in ["2022-12-01", "2022-12-01X08:30:00", "2022-12-01T08:30:00+5", "2022-12-01T25:00:00"] {
            assert!(s.parse::<DateTime>().is_err(), "Expected error for `{}`", s);
        }
    }

    #[test]
    fn test_chrono_conversions() {
        let date = Date::new(2023, 3, 1).unwrap();
        let naive = NaiveDate::from(date);
        assert_eq!(Date::try_from(naive).unwrap(), date);

        let time = Time::new(23, 49, 10, 123_456_000).unwrap();
        let naive = NaiveTime::from(time);
        assert_eq!(Time::from(naive), time);

        let offset = TimeOffset::new(-300).unwrap();
        let fixed = FixedOffset::from(offset);
        assert_eq!(fixed.local_minus_utc(), -300 * 60);
        assert_eq!(TimeOffset::try_from(fixed).unwrap(), offset);

        let odd = FixedOffset::east_opt(90).unwrap();
        assert!(TimeOffset::try_from(odd).unwrap_err().is_value_error());
    }

    #[test]
    fn test_offset_bounds() {
        assert!(TimeOffset::new(24 * 60).is_err());
        assert!(TimeOffset::new(i32::MAX).is_err());
        assert_eq!(TimeOffset::new(-(23 * 60 + 59)).unwrap().minutes(), -(23 * 60 + 59));
        assert_eq!(TimeOffset::new(-420).unwrap().to_string(), "-07:00");
    }
}
