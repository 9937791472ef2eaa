use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};

use crate::encode::ffmpeg::{EncodeRequest, FfmpegEncoder, ProcessRunner};
use crate::encode::frames::FrameDir;
use crate::foundation::calendar::REFERENCE_YEAR;
use crate::foundation::error::{LitError, LitResult};
use crate::layer::store::LayerStore;
use crate::layer::tagged::TaggedLayer;
use crate::schedule::config::{AnimationConfig, ExportSettings, Resolution};
use crate::schedule::run::{AnimationRun, RunMode};
use crate::schedule::scheduler::{FrameSequence, ScheduledFrame, SunBounds};
use crate::visibility::VisibilityEngine;

/// Status shown while frames are captured.
pub const STATUS_EXPORTING_FRAMES: &str = "Exporting animation frames... Please wait.";
/// Status shown while the encoder runs.
pub const STATUS_ENCODING: &str = "Creating animation with FFmpeg... Please wait.";

/// The host's simulated clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimTime {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Offset of the model's time zone, in seconds.
    pub utc_offset: i64,
}

impl SimTime {
    /// Wall-clock date and time the layers are matched against.
    pub fn wall_clock(self) -> LitResult<NaiveDateTime> {
        self.timestamp
            .checked_sub(self.utc_offset)
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| {
                LitError::validation(format!(
                    "simulated timestamp {} is out of range",
                    self.timestamp
                ))
            })
    }
}

/// Everything an animation run needs from the 3D host.
pub trait AnimationHost {
    /// Drawing layers.
    fn layers(&self) -> &dyn LayerStore;
    /// Drawing layers, mutable.
    fn layers_mut(&mut self) -> &mut dyn LayerStore;
    /// Current simulated clock.
    fn simulated_time(&self) -> SimTime;
    /// Move the simulated clock, keeping the UTC offset.
    fn set_simulated_time(&mut self, timestamp: i64);
    /// Sunrise and sunset of the current simulated day.
    fn sun_bounds(&self) -> SunBounds;
    /// Redraw the viewport.
    fn refresh(&mut self) {}
    /// Write the current view to `path` as a JPEG of `resolution`.
    fn render_frame(&mut self, path: &Path, resolution: Resolution) -> LitResult<()>;
    /// Show or clear a status line.
    fn set_status(&mut self, _text: Option<&str>) {}
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// No layer carries a time window.
    NothingToAnimate,
    /// Skip-nights dropped every frame.
    AllFramesSkipped,
    /// `should_continue` stopped the run.
    Cancelled {
        /// Frames shown before stopping.
        frames: u64,
    },
    /// Every frame was shown.
    Played {
        /// Frames shown.
        frames: u64,
    },
    /// Every frame was captured and encoded.
    Exported {
        /// Encoded file.
        output: PathBuf,
        /// Frames captured.
        frames: u64,
    },
}

/// Where and how to write an exported animation.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Encoder settings.
    pub settings: ExportSettings,
    /// Output file.
    pub output: PathBuf,
    /// Frame directory, missing or empty; a per-process temp directory when `None`.
    pub frames_dir: Option<PathBuf>,
    /// Leave captured frames on disk whatever the result.
    pub keep_frames: bool,
}

impl ExportOptions {
    /// Options writing `output` with `settings` through a temp frame directory.
    pub fn new(settings: ExportSettings, output: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            output: output.into(),
            frames_dir: None,
            keep_frames: false,
        }
    }
}

/// Restores the host clock, and the layer visibility it implies, on drop.
struct ClockGuard<'a, H: AnimationHost + ?Sized> {
    host: &'a mut H,
    saved: SimTime,
}

impl<'a, H: AnimationHost + ?Sized> ClockGuard<'a, H> {
    fn new(host: &'a mut H) -> Self {
        let saved = host.simulated_time();
        Self { host, saved }
    }
}

impl<H: AnimationHost + ?Sized> Deref for ClockGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: AnimationHost + ?Sized> DerefMut for ClockGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: AnimationHost + ?Sized> Drop for ClockGuard<'_, H> {
    fn drop(&mut self) {
        self.host.set_simulated_time(self.saved.timestamp);
        match self.saved.wall_clock() {
            Ok(instant) => {
                VisibilityEngine::update_all(self.host.layers_mut(), instant);
            }
            Err(err) => tracing::warn!(%err, "could not restore layer visibility"),
        }
        self.host.refresh();
    }
}

/// Time layers of `host`, or `None` when there are none.
fn time_layers<H: AnimationHost + ?Sized>(host: &H) -> Option<Vec<TaggedLayer>> {
    let layers = TaggedLayer::load_all(host.layers());
    if VisibilityEngine::count_time_layers(&layers) == 0 {
        tracing::info!("no time layers to animate");
        return None;
    }
    Some(layers)
}

fn start_run<'r, H: AnimationHost + ?Sized>(
    run: &'r mut AnimationRun,
    clock: &mut ClockGuard<'_, H>,
    layers: &[TaggedLayer],
    mode: RunMode,
) -> LitResult<&'r FrameSequence> {
    run.schedule(layers, REFERENCE_YEAR, clock.saved.utc_offset)?;
    run.skip_nights(|timestamp| {
        clock.set_simulated_time(timestamp);
        clock.sun_bounds()
    })?;
    run.start(mode)
}

fn show_frame<H: AnimationHost + ?Sized>(
    host: &mut H,
    layers: &[TaggedLayer],
    frame: &ScheduledFrame,
) -> LitResult<()> {
    host.set_simulated_time(frame.timestamp);
    let instant = frame.sample.in_year(REFERENCE_YEAR)?;
    let updated = VisibilityEngine::apply(host.layers_mut(), layers, instant);
    host.refresh();
    tracing::debug!(timestamp = frame.timestamp, %instant, updated, "frame");
    Ok(())
}

/// Show and capture each frame. Returns `false` when `should_continue` stopped early.
fn capture_frames<H: AnimationHost + ?Sized>(
    host: &mut H,
    layers: &[TaggedLayer],
    sequence: &FrameSequence,
    dir: &mut FrameDir,
    resolution: Resolution,
    should_continue: &mut impl FnMut(u64) -> bool,
) -> LitResult<bool> {
    for frame in sequence {
        if !should_continue(dir.frame_count()) {
            return Ok(false);
        }
        show_frame(host, layers, frame)?;
        dir.capture(|path| host.render_frame(path, resolution))?;
    }
    Ok(true)
}

/// Step the host through every scheduled frame without capturing.
///
/// `should_continue` is asked before each frame with the number already shown. The simulated
/// clock is restored however the run ends.
#[tracing::instrument(skip_all, fields(frames_per_day = config.frames_per_day, skip_nights = config.skip_nights))]
pub fn play<H: AnimationHost + ?Sized>(
    host: &mut H,
    config: &AnimationConfig,
    mut should_continue: impl FnMut(u64) -> bool,
) -> LitResult<AnimationOutcome> {
    let Some(layers) = time_layers(&*host) else {
        return Ok(AnimationOutcome::NothingToAnimate);
    };
    let mut run = AnimationRun::new();
    run.configure(config.clone())?;

    let mut clock = ClockGuard::new(host);
    let sequence = start_run(&mut run, &mut clock, &layers, RunMode::Preview)?;
    if sequence.is_empty() {
        return Ok(AnimationOutcome::AllFramesSkipped);
    }

    let mut shown = 0;
    for frame in sequence {
        if !should_continue(shown) {
            tracing::info!(frames = shown, "animation cancelled");
            return Ok(AnimationOutcome::Cancelled { frames: shown });
        }
        show_frame(&mut *clock, &layers, frame)?;
        shown += 1;
    }
    run.finish();
    tracing::info!(frames = shown, "animation played");
    Ok(AnimationOutcome::Played { frames: shown })
}

/// Capture every scheduled frame and encode them into `opts.output`.
///
/// Configuration and export settings are checked before the clock moves. The clock is restored
/// before encoding starts. Captured frames are removed afterwards unless `opts.keep_frames` is set.
#[tracing::instrument(skip_all, fields(output = %opts.output.display(), format = %opts.settings.format))]
pub fn export<H, R>(
    host: &mut H,
    config: &AnimationConfig,
    opts: &ExportOptions,
    encoder: &FfmpegEncoder<R>,
    mut should_continue: impl FnMut(u64) -> bool,
) -> LitResult<AnimationOutcome>
where
    H: AnimationHost + ?Sized,
    R: ProcessRunner,
{
    let Some(layers) = time_layers(&*host) else {
        return Ok(AnimationOutcome::NothingToAnimate);
    };
    let mut run = AnimationRun::new();
    run.configure(config.clone())?;
    opts.settings.validate()?;

    let mut dir = match &opts.frames_dir {
        Some(path) => FrameDir::create(path)?,
        None => FrameDir::in_temp_dir()?,
    };
    if opts.keep_frames {
        dir.keep();
    }

    let mut clock = ClockGuard::new(host);
    let sequence = start_run(&mut run, &mut clock, &layers, RunMode::Export)?;
    if sequence.is_empty() {
        return Ok(AnimationOutcome::AllFramesSkipped);
    }

    clock.set_status(Some(STATUS_EXPORTING_FRAMES));
    let captured = capture_frames(
        &mut *clock,
        &layers,
        sequence,
        &mut dir,
        opts.settings.resolution,
        &mut should_continue,
    );
    clock.set_status(None);
    if !captured? {
        let frames = dir.frame_count();
        tracing::info!(frames, "export cancelled");
        return Ok(AnimationOutcome::Cancelled { frames });
    }
    let frames = dir.frame_count();
    run.finish();
    drop(clock);

    host.set_status(Some(STATUS_ENCODING));
    let req = EncodeRequest {
        input_pattern: dir.input_pattern(),
        settings: opts.settings.clone(),
        output: opts.output.clone(),
    };
    let encoded = encoder.encode(&req);
    host.set_status(None);
    encoded?;

    if !opts.keep_frames
        && let Err(err) = dir.remove()
    {
        tracing::warn!(%err, "failed to remove animation frames");
    }
    tracing::info!(frames, output = %opts.output.display(), "animation exported");
    Ok(AnimationOutcome::Exported {
        output: opts.output.clone(),
        frames,
    })
}

#[cfg(test)]
#[path = "../tests/unit/animate.rs"]
mod tests;
