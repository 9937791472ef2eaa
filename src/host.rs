use std::path::Path;

use anyhow::Context as _;
use chrono::{NaiveDateTime, NaiveTime, Timelike as _};

use crate::animate::{AnimationHost, SimTime};
use crate::foundation::calendar::TimeOfDay;
use crate::foundation::error::{LitError, LitResult};
use crate::layer::store::{LayerStore, MemoryLayers};
use crate::layer::tagged::TaggedLayer;
use crate::schedule::config::Resolution;
use crate::schedule::scheduler::SunBounds;

const NIGHT_SKY: [u8; 3] = [18, 20, 40];
const DAY_SKY: [u8; 3] = [130, 185, 235];
const DEFAULT_SUNRISE: TimeOfDay = TimeOfDay {
    hour: 6,
    minute: 0,
    second: 0,
};
const DEFAULT_SUNSET: TimeOfDay = TimeOfDay {
    hour: 18,
    minute: 0,
    second: 0,
};
const BAND_COLORS: [[u8; 3]; 6] = [
    [230, 90, 70],
    [80, 170, 90],
    [240, 190, 60],
    [90, 110, 220],
    [200, 100, 200],
    [70, 190, 190],
];

/// Headless host over [`MemoryLayers`].
///
/// Frames are flat JPEGs: a sky shade following the hour, plus one colored band per time layer,
/// drawn only while that layer is visible.
#[derive(Clone, Debug)]
pub struct MemoryHost {
    layers: MemoryLayers,
    time: SimTime,
    sunrise: TimeOfDay,
    sunset: TimeOfDay,
    status: Option<String>,
    refreshes: u64,
}

impl MemoryHost {
    /// Host whose clock reads `time`. Days run from 06:00 to 18:00.
    pub fn new(layers: MemoryLayers, time: SimTime) -> Self {
        Self {
            layers,
            time,
            sunrise: DEFAULT_SUNRISE,
            sunset: DEFAULT_SUNSET,
            status: None,
            refreshes: 0,
        }
    }

    /// Host whose clock shows `wall_clock` in a zone `utc_offset` seconds from UTC.
    pub fn at(layers: MemoryLayers, wall_clock: NaiveDateTime, utc_offset: i64) -> Self {
        let timestamp = wall_clock.and_utc().timestamp().saturating_add(utc_offset);
        Self::new(
            layers,
            SimTime {
                timestamp,
                utc_offset,
            },
        )
    }

    /// Set the daily sunrise and sunset.
    pub fn with_daylight(mut self, sunrise: TimeOfDay, sunset: TimeOfDay) -> Self {
        self.sunrise = sunrise;
        self.sunset = sunset;
        self
    }

    /// Layer store.
    pub fn store(&self) -> &MemoryLayers {
        &self.layers
    }

    /// Give the layer store back.
    pub fn into_store(self) -> MemoryLayers {
        self.layers
    }

    /// Current status line.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Number of viewport refreshes so far.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    fn midnight_timestamp(&self) -> LitResult<i64> {
        let wall = self.time.wall_clock()?;
        let midnight = wall.date().and_time(NaiveTime::MIN).and_utc().timestamp();
        midnight
            .checked_add(self.time.utc_offset)
            .ok_or_else(|| LitError::validation("utc offset is out of range"))
    }

    fn sky(&self) -> LitResult<[u8; 3]> {
        let wall = self.time.wall_clock()?;
        let hours = wall.hour() as f32 + wall.minute() as f32 / 60.0;
        let light = 1.0 - ((hours - 12.0).abs() / 12.0);
        Ok(std::array::from_fn(|i| {
            let (n, d) = (NIGHT_SKY[i] as f32, DAY_SKY[i] as f32);
            (n + (d - n) * light).round() as u8
        }))
    }
}

impl AnimationHost for MemoryHost {
    fn layers(&self) -> &dyn LayerStore {
        &self.layers
    }

    fn layers_mut(&mut self) -> &mut dyn LayerStore {
        &mut self.layers
    }

    fn simulated_time(&self) -> SimTime {
        self.time
    }

    fn set_simulated_time(&mut self, timestamp: i64) {
        self.time.timestamp = timestamp;
    }

    fn sun_bounds(&self) -> SunBounds {
        let midnight = self.midnight_timestamp().unwrap_or(self.time.timestamp);
        SunBounds {
            sunrise: midnight.saturating_add(i64::from(self.sunrise.second_of_day())),
            sunset: midnight.saturating_add(i64::from(self.sunset.second_of_day())),
        }
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
    }

    fn render_frame(&mut self, path: &Path, resolution: Resolution) -> LitResult<()> {
        let Resolution { width, height } = resolution;
        if width == 0 || height == 0 {
            return Err(LitError::validation("frame width/height must be non-zero"));
        }

        let sky = self.sky()?;
        let bands: Vec<bool> = TaggedLayer::load_all(&self.layers)
            .iter()
            .filter(|l| l.is_time_layer())
            .map(|l| self.layers.is_visible(l.id()))
            .collect();
        let slot = (height / (bands.len() as u32 + 2)).max(1);

        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            let band = (y / slot).checked_sub(1).map(|b| b as usize);
            let color = match band {
                Some(b) if bands.get(b).copied().unwrap_or(false) => {
                    BAND_COLORS[b % BAND_COLORS.len()]
                }
                _ => sky,
            };
            for _ in 0..width {
                rgb.extend_from_slice(&color);
            }
        }

        image::save_buffer_with_format(
            path,
            &rgb,
            width,
            height,
            image::ColorType::Rgb8,
            image::ImageFormat::Jpeg,
        )
        .with_context(|| format!("write jpeg '{}'", path.display()))?;
        Ok(())
    }

    fn set_status(&mut self, text: Option<&str>) {
        self.status = text.map(str::to_owned);
    }
}

#[cfg(test)]
#[path = "../tests/unit/host.rs"]
mod tests;
