use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::foundation::calendar::SECONDS_PER_DAY;
use crate::foundation::error::{LitError, LitResult};

/// Resolutions offered by the export dialog.
pub const RESOLUTION_PRESETS: [&str; 6] = [
    "854x480",
    "1280x720",
    "1920x1080",
    "2560x1440",
    "3840x2160",
    "7680x4320",
];
/// Frames-per-day values offered by the play/export dialogs.
pub const FRAMES_PER_DAY_CHOICES: [u32; 8] = [2, 6, 12, 24, 48, 72, 96, 120];
/// Frame rates offered by the export dialog.
pub const FPS_CHOICES: [u32; 8] = [1, 12, 16, 24, 25, 30, 50, 60];
/// MP4 quality values offered by the export dialog (lower is better).
pub const CRF_CHOICES: std::ops::RangeInclusive<u32> = 18..=28;

/// Base name used when the document has never been saved.
pub const UNTITLED_BASENAME: &str = "Untitled model";

/// Output container of an exported animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnimationFormat {
    /// Animated GIF with a generated palette.
    Gif,
    /// H.264 MP4.
    #[default]
    Mp4,
}

impl AnimationFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Mp4 => "mp4",
        }
    }
}

impl FromStr for AnimationFormat {
    type Err = LitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gif" => Ok(Self::Gif),
            "mp4" => Ok(Self::Mp4),
            other => Err(LitError::validation(format!(
                "unknown animation format '{other}' (expected GIF or MP4)"
            ))),
        }
    }
}

impl fmt::Display for AnimationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gif => "GIF",
            Self::Mp4 => "MP4",
        })
    }
}

/// Output size in pixels, written `WxH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Construct without validation.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl FromStr for Resolution {
    type Err = LitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || LitError::validation(format!("resolution '{s}' is not of the form WxH"));
        let (w, h) = s.split_once('x').ok_or_else(bad)?;
        let width = w.trim().parse::<u32>().map_err(|_| bad())?;
        let height = h.trim().parse::<u32>().map_err(|_| bad())?;
        Ok(Self { width, height })
    }
}

impl TryFrom<String> for Resolution {
    type Error = LitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Sampling settings shared by preview and export.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Samples per simulated day, in `[1, 86400]`.
    pub frames_per_day: u32,
    /// Drop samples outside the sunrise/sunset bounds of their day.
    pub skip_nights: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames_per_day: 24,
            skip_nights: false,
        }
    }
}

impl AnimationConfig {
    /// Fail with a configuration error when `frames_per_day` is out of range.
    pub fn validate(&self) -> LitResult<()> {
        validate_frames_per_day(self.frames_per_day)
    }
}

/// Fail with a configuration error unless `frames_per_day` is in `[1, 86400]`.
pub fn validate_frames_per_day(frames_per_day: u32) -> LitResult<()> {
    if !(1..=SECONDS_PER_DAY).contains(&frames_per_day) {
        return Err(LitError::configuration(format!(
            "animation frames per day must be between 1 and {SECONDS_PER_DAY}, got {frames_per_day}"
        )));
    }
    Ok(())
}

/// Encoder-facing settings, only consulted when exporting.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Output container.
    pub format: AnimationFormat,
    /// Frame size.
    pub resolution: Resolution,
    /// Playback rate of the output.
    pub frames_per_second: u32,
    /// x264 constant rate factor; MP4 only.
    pub constant_rate_factor: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: AnimationFormat::Mp4,
            resolution: Resolution::default(),
            frames_per_second: 24,
            constant_rate_factor: 23,
        }
    }
}

impl ExportSettings {
    /// Check values the encoder would reject.
    pub fn validate(&self) -> LitResult<()> {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(LitError::validation(
                "export width/height must be non-zero",
            ));
        }
        if self.frames_per_second == 0 {
            return Err(LitError::validation("export fps must be non-zero"));
        }
        if self.format == AnimationFormat::Mp4 {
            if !self.resolution.width.is_multiple_of(2) || !self.resolution.height.is_multiple_of(2)
            {
                return Err(LitError::validation(
                    "export width/height must be even (required for yuv420p mp4 output)",
                ));
            }
            if self.constant_rate_factor > 51 {
                return Err(LitError::validation(
                    "mp4 constant rate factor must be between 0 and 51",
                ));
            }
        }
        Ok(())
    }
}

/// Default output file name for a document: `model.skp` becomes `model.<ext>`.
pub fn output_file_name(document: Option<&Path>, format: AnimationFormat) -> String {
    let stem = document
        .filter(|p| !p.as_os_str().is_empty())
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNTITLED_BASENAME.to_owned());
    format!("{stem}.{}", format.extension())
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/config.rs"]
mod tests;
