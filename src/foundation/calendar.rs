use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::foundation::error::{LitError, LitResult};

/// Non-leap year used to resolve month/day pairs to a day-of-year.
///
/// Feb 29 does not exist in this year, so it can never be a window boundary.
pub const REFERENCE_YEAR: i32 = 2021;

/// Seconds in one simulated day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Days in the reference year.
pub const DAYS_PER_YEAR: u32 = 365;

/// A calendar day without a year, always valid in [`REFERENCE_YEAR`].
///
/// Ordering is chronological: by month, then day.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct MonthDay {
    /// Month, 1-based.
    pub month: u32,
    /// Day of month, 1-based.
    pub day: u32,
}

impl MonthDay {
    /// Sentinel date used when no dates-tagged layer exists.
    pub const NEW_YEAR: MonthDay = MonthDay { month: 1, day: 1 };

    /// Return `None` unless `month/day` exists in a non-leap year.
    pub fn new(month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day).map(|_| Self { month, day })
    }

    /// 1-based position within [`REFERENCE_YEAR`], in `[1, 365]`.
    pub fn day_of_year(self) -> u32 {
        self.in_year(REFERENCE_YEAR)
            .map(|d| d.ordinal())
            .unwrap_or(1)
    }

    /// Resolve this day in a concrete year.
    pub fn in_year(self, year: i32) -> LitResult<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).ok_or_else(|| {
            LitError::validation(format!("{self} does not exist in year {year}"))
        })
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.day)
    }
}

/// A wall-clock time with second resolution.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TimeOfDay {
    /// Hour in `[0, 23]`.
    pub hour: u32,
    /// Minute in `[0, 59]`.
    pub minute: u32,
    /// Second in `[0, 59]`.
    pub second: u32,
}

impl TimeOfDay {
    /// Midnight.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Return `None` for out-of-range components.
    pub fn new(hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, second).map(|_| Self {
            hour,
            minute,
            second,
        })
    }

    /// Interpret `offset` as seconds since the Unix epoch in UTC and keep the clock part.
    ///
    /// An offset of exactly one day lands on midnight of the following day.
    pub fn from_utc_offset(offset: i64) -> Self {
        let secs = offset.rem_euclid(i64::from(SECONDS_PER_DAY)) as u32;
        Self {
            hour: secs / 3600,
            minute: (secs % 3600) / 60,
            second: secs % 60,
        }
    }

    /// Seconds since midnight, in `[0, 86399]`.
    pub fn second_of_day(self) -> u32 {
        self.hour * 3600 + self.minute * 60 + self.second
    }

    pub(crate) fn to_naive(self) -> LitResult<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, self.second)
            .ok_or_else(|| LitError::validation(format!("invalid time of day {self}")))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Day-of-year of `date` projected onto the non-leap reference calendar.
///
/// In leap years every day from Feb 29 onward shifts back by one, so Feb 28 and Feb 29
/// both map to day 59.
pub fn reference_day_of_year(date: NaiveDate) -> u32 {
    let ordinal = date.ordinal();
    if date.leap_year() && ordinal >= 60 {
        ordinal - 1
    } else {
        ordinal
    }
}

/// Second-of-day of `time` at minute resolution.
///
/// Seconds are dropped, so `17:00:45` still counts as `17:00`.
pub fn minute_second_of_day(time: NaiveTime) -> u32 {
    time.hour() * 3600 + time.minute() * 60
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/calendar.rs"]
mod tests;
