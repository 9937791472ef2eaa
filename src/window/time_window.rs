use std::fmt;

use chrono::NaiveDateTime;

use crate::foundation::calendar::{
    DAYS_PER_YEAR, MonthDay, SECONDS_PER_DAY, minute_second_of_day, reference_day_of_year,
};

/// Editor placeholder meaning "no dates".
pub const DATES_PLACEHOLDER: &str = "__/__ - __/__";
/// Editor placeholder meaning "no hours".
pub const HOURS_PLACEHOLDER: &str = "__:__ - __:__";

/// Which grammar a [`TimeWindow`] was parsed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowKind {
    /// `MM/DD - MM/DD`.
    Dates,
    /// `HH:MM - HH:MM`.
    Hours,
    /// Unset, empty, or malformed input.
    None,
}

/// Inclusive calendar-day range, possibly crossing New Year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: MonthDay,
    end: MonthDay,
    start_day_of_year: u32,
    end_day_of_year: u32,
}

impl DateRange {
    fn new(start: MonthDay, end: MonthDay) -> Self {
        Self {
            start,
            end,
            start_day_of_year: start.day_of_year(),
            end_day_of_year: end.day_of_year(),
        }
    }

    /// First day of the range.
    pub fn start(&self) -> MonthDay {
        self.start
    }

    /// Last day of the range (inclusive).
    pub fn end(&self) -> MonthDay {
        self.end
    }

    /// Reference day-of-year of [`Self::start`].
    pub fn start_day_of_year(&self) -> u32 {
        self.start_day_of_year
    }

    /// Reference day-of-year of [`Self::end`].
    pub fn end_day_of_year(&self) -> u32 {
        self.end_day_of_year
    }

    /// `true` when the range runs through Dec 31 into Jan 1.
    pub fn wraps(&self) -> bool {
        self.start_day_of_year > self.end_day_of_year
    }

    /// Test a reference day-of-year (`[1, 365]`) against the range.
    pub fn contains_day_of_year(&self, day: u32) -> bool {
        if self.wraps() {
            (self.start_day_of_year..=DAYS_PER_YEAR).contains(&day)
                || (1..=self.end_day_of_year).contains(&day)
        } else {
            (self.start_day_of_year..=self.end_day_of_year).contains(&day)
        }
    }
}

/// Inclusive clock range at minute resolution, possibly crossing midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HourRange {
    start_hour: u32,
    start_minute: u32,
    end_hour: u32,
    end_minute: u32,
}

impl HourRange {
    /// `(hour, minute)` of the range start.
    pub fn start(&self) -> (u32, u32) {
        (self.start_hour, self.start_minute)
    }

    /// `(hour, minute)` of the range end (inclusive).
    pub fn end(&self) -> (u32, u32) {
        (self.end_hour, self.end_minute)
    }

    /// Second-of-day of the range start.
    pub fn start_second_of_day(&self) -> u32 {
        self.start_hour * 3600 + self.start_minute * 60
    }

    /// Second-of-day of the range end.
    pub fn end_second_of_day(&self) -> u32 {
        self.end_hour * 3600 + self.end_minute * 60
    }

    /// `true` when the range runs through midnight.
    pub fn wraps(&self) -> bool {
        self.start_second_of_day() > self.end_second_of_day()
    }

    /// Test a second-of-day against the range.
    pub fn contains_second_of_day(&self, second: u32) -> bool {
        let (start, end) = (self.start_second_of_day(), self.end_second_of_day());
        if self.wraps() {
            (start..=SECONDS_PER_DAY).contains(&second) || (0..=end).contains(&second)
        } else {
            (start..=end).contains(&second)
        }
    }
}

/// A parsed date window or hour window.
///
/// Parsing never fails: anything outside the two grammars becomes [`TimeWindow::None`], which
/// matches no instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    /// Calendar-day window.
    Dates(DateRange),
    /// Clock window.
    Hours(HourRange),
    /// No window.
    #[default]
    None,
}

impl TimeWindow {
    /// Parse either grammar.
    pub fn parse(raw: &str) -> Self {
        match Self::parse_dates(raw) {
            Self::None => Self::parse_hours(raw),
            dates => dates,
        }
    }

    /// Parse `MM/DD - MM/DD`; any other input is [`TimeWindow::None`].
    pub fn parse_dates(raw: &str) -> Self {
        let Some(((sm, sd), (em, ed))) = split_range(raw, b'/') else {
            return Self::None;
        };
        match (MonthDay::new(sm, sd), MonthDay::new(em, ed)) {
            (Some(start), Some(end)) => Self::Dates(DateRange::new(start, end)),
            _ => Self::None,
        }
    }

    /// Parse `HH:MM - HH:MM`; any other input is [`TimeWindow::None`].
    pub fn parse_hours(raw: &str) -> Self {
        let Some(((sh, smin), (eh, emin))) = split_range(raw, b':') else {
            return Self::None;
        };
        if sh > 23 || eh > 23 || smin > 59 || emin > 59 {
            return Self::None;
        }
        Self::Hours(HourRange {
            start_hour: sh,
            start_minute: smin,
            end_hour: eh,
            end_minute: emin,
        })
    }

    /// Grammar this window came from.
    pub fn kind(&self) -> WindowKind {
        match self {
            Self::Dates(_) => WindowKind::Dates,
            Self::Hours(_) => WindowKind::Hours,
            Self::None => WindowKind::None,
        }
    }

    /// `true` for [`TimeWindow::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Date range, if this is a dates window.
    pub fn as_dates(&self) -> Option<&DateRange> {
        match self {
            Self::Dates(d) => Some(d),
            _ => None,
        }
    }

    /// Hour range, if this is an hours window.
    pub fn as_hours(&self) -> Option<&HourRange> {
        match self {
            Self::Hours(h) => Some(h),
            _ => None,
        }
    }

    /// Decide whether `instant` (wall-clock, host-local) falls inside the window.
    ///
    /// Dates are compared on the non-leap reference calendar and hours at minute resolution.
    pub fn matches(&self, instant: NaiveDateTime) -> bool {
        match self {
            Self::Dates(d) => d.contains_day_of_year(reference_day_of_year(instant.date())),
            Self::Hours(h) => h.contains_second_of_day(minute_second_of_day(instant.time())),
            Self::None => false,
        }
    }
}

impl fmt::Display for TimeWindow {
    /// Canonical textual form; empty for [`TimeWindow::None`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dates(d) => write!(f, "{} - {}", d.start, d.end),
            Self::Hours(h) => write!(
                f,
                "{:02}:{:02} - {:02}:{:02}",
                h.start_hour, h.start_minute, h.end_hour, h.end_minute
            ),
            Self::None => Ok(()),
        }
    }
}

/// Split `AA?BB - CC?DD` into two numeric pairs, where `?` is `sep`.
fn split_range(raw: &str, sep: u8) -> Option<((u32, u32), (u32, u32))> {
    let b = raw.as_bytes();
    if b.len() != 13 || &b[5..8] != b" - " {
        return None;
    }
    Some((pair(&b[0..5], sep)?, pair(&b[8..13], sep)?))
}

fn pair(b: &[u8], sep: u8) -> Option<(u32, u32)> {
    if b[2] != sep {
        return None;
    }
    Some((two_digits(&b[0..2])?, two_digits(&b[3..5])?))
}

fn two_digits(b: &[u8]) -> Option<u32> {
    match b {
        [hi @ b'0'..=b'9', lo @ b'0'..=b'9'] => {
            Some(u32::from(*hi - b'0') * 10 + u32::from(*lo - b'0'))
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/window/time_window.rs"]
mod tests;
