use chrono::NaiveDateTime;

use crate::foundation::calendar::{MonthDay, SECONDS_PER_DAY, TimeOfDay};
use crate::foundation::error::{LitError, LitResult};
use crate::layer::tagged::TaggedLayer;
use crate::schedule::config::validate_frames_per_day;

/// One point of the simulated clock, before it is tied to a year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Sample {
    /// Calendar day.
    pub date: MonthDay,
    /// Clock time on that day.
    pub time: TimeOfDay,
}

impl Sample {
    /// Wall-clock value of this sample in `year`.
    pub fn in_year(self, year: i32) -> LitResult<NaiveDateTime> {
        Ok(self.date.in_year(year)?.and_time(self.time.to_naive()?))
    }
}

/// A sample resolved to a simulated Unix timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledFrame {
    /// Calendar/clock sample.
    pub sample: Sample,
    /// Simulated Unix timestamp in seconds.
    pub timestamp: i64,
}

/// Sunrise/sunset of one simulated day, as Unix timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SunBounds {
    /// Sunrise timestamp.
    pub sunrise: i64,
    /// Sunset timestamp.
    pub sunset: i64,
}

impl SunBounds {
    /// `true` when `timestamp` is within `[sunrise, sunset]`.
    pub fn admits(self, timestamp: i64) -> bool {
        (self.sunrise..=self.sunset).contains(&timestamp)
    }
}

/// Ordered frames of one animation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<ScheduledFrame>,
}

impl FrameSequence {
    /// Frames in visiting order.
    pub fn frames(&self) -> &[ScheduledFrame] {
        &self.frames
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate frames in visiting order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScheduledFrame> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a ScheduledFrame;
    type IntoIter = std::slice::Iter<'a, ScheduledFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Start days of all dates-tagged layers, chronologically.
///
/// Duplicates are kept. With no dates layer the list is the single day `01/01`, so hours-only
/// animations still have a day to run on.
pub fn derive_dates(layers: &[TaggedLayer]) -> Vec<MonthDay> {
    let mut dates: Vec<MonthDay> = layers
        .iter()
        .filter_map(|l| l.dates().as_dates().map(|d| d.start()))
        .collect();
    dates.sort();
    if dates.is_empty() {
        dates.push(MonthDay::NEW_YEAR);
    }
    dates
}

/// Cumulative second offsets `step, 2*step, ..., frames_per_day*step` with
/// `step = 86400 / frames_per_day`.
pub fn derive_offsets(frames_per_day: u32) -> LitResult<Vec<u32>> {
    validate_frames_per_day(frames_per_day)?;
    let step = SECONDS_PER_DAY / frames_per_day;
    Ok((1..=frames_per_day).map(|k| k * step).collect())
}

/// Clock times of the samples taken on each day.
///
/// The day start is never sampled; a full-day offset wraps to `00:00:00`.
pub fn derive_hours(frames_per_day: u32) -> LitResult<Vec<TimeOfDay>> {
    Ok(derive_offsets(frames_per_day)?
        .into_iter()
        .map(|off| TimeOfDay::from_utc_offset(i64::from(off)))
        .collect())
}

/// Cross product of `dates` and `hours`, dates in the outer loop.
pub fn build_sequence(dates: &[MonthDay], hours: &[TimeOfDay]) -> Vec<Sample> {
    dates
        .iter()
        .flat_map(|&date| hours.iter().map(move |&time| Sample { date, time }))
        .collect()
}

/// Simulated timestamp of `date`/`hour` in `reference_year`, shifted by `utc_offset` seconds.
pub fn timestamp_for(
    date: MonthDay,
    hour: TimeOfDay,
    reference_year: i32,
    utc_offset: i64,
) -> LitResult<i64> {
    let naive = Sample { date, time: hour }.in_year(reference_year)?;
    naive
        .and_utc()
        .timestamp()
        .checked_add(utc_offset)
        .ok_or_else(|| LitError::validation(format!("utc offset {utc_offset}s is out of range")))
}

/// Resolve every sample to a timestamp, keeping order.
pub fn schedule(samples: &[Sample], reference_year: i32, utc_offset: i64) -> LitResult<FrameSequence> {
    let frames = samples
        .iter()
        .map(|&sample| {
            Ok(ScheduledFrame {
                sample,
                timestamp: timestamp_for(sample.date, sample.time, reference_year, utc_offset)?,
            })
        })
        .collect::<LitResult<Vec<_>>>()?;
    Ok(FrameSequence { frames })
}

/// Drop frames outside their day's sunrise/sunset when `skip_nights` is set.
///
/// `bounds_at` is asked once per frame, in order, with that frame's timestamp.
pub fn apply_skip_nights(
    sequence: FrameSequence,
    skip_nights: bool,
    mut bounds_at: impl FnMut(i64) -> SunBounds,
) -> FrameSequence {
    if !skip_nights {
        return sequence;
    }
    let frames = sequence
        .frames
        .into_iter()
        .filter(|f| bounds_at(f.timestamp).admits(f.timestamp))
        .collect();
    FrameSequence { frames }
}

/// Pair each frame with its output index, counting emitted frames from zero.
pub fn number_frames(sequence: &FrameSequence) -> Vec<(u64, ScheduledFrame)> {
    sequence
        .iter()
        .enumerate()
        .map(|(i, f)| (i as u64, *f))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
