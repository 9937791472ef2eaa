//! Layers In Time shows and hides drawing layers according to the simulated date and time of a 3D
//! model, and animates or exports a model through time.
//!
//! - Tag layers with a yearly date window or a daily hour window ([`TimeWindow`], [`TaggedLayer`])
//! - Apply windows to the host's layers for a given instant ([`VisibilityEngine`])
//! - Step the host clock through a schedule and optionally encode the frames ([`play`], [`export`])
//!
//! The host application is reached through [`LayerStore`] and [`AnimationHost`]; [`MemoryHost`]
//! is a headless implementation.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Preview and export drivers.
pub mod animate;
pub(crate) mod encode;
/// Headless host.
pub mod host;
pub(crate) mod interchange;
pub(crate) mod layer;
pub(crate) mod schedule;
/// Per-application state.
pub mod session;
/// Applying windows to layer visibility.
pub mod visibility;
pub(crate) mod window;

pub use crate::foundation::calendar::{
    DAYS_PER_YEAR, MonthDay, REFERENCE_YEAR, SECONDS_PER_DAY, TimeOfDay, reference_day_of_year,
};
pub use crate::foundation::error::{LitError, LitResult};

pub use crate::animate::{
    AnimationHost, AnimationOutcome, ExportOptions, SimTime, export, play,
};
pub use crate::encode::ffmpeg::{
    EncodeRequest, EncoderCommand, FFMPEG_ENV, FfmpegEncoder, ProcessReport, ProcessRunner,
    SystemRunner, build_command, is_ffmpeg_on_path,
};
pub use crate::encode::frames::{FrameDir, export_frames, frame_file_name};
pub use crate::host::MemoryHost;
pub use crate::interchange::component::{
    COMPONENT_LAYER_KEY, COMPONENT_TIME_LAYERS_KEY, ComponentBundle, DefinitionId, DefinitionStore,
    PlaceOutcome, consume_on_place,
};
pub use crate::interchange::json::{
    LayerTimeData, TimeLayersMap, collect_named, collect_time_layers, export_json, import_json,
    import_map,
};
pub use crate::layer::store::{LayerId, LayerStore, MemoryLayers};
pub use crate::layer::tagged::{ATTRIBUTE_NAMESPACE, DATES_KEY, HOURS_KEY, TaggedLayer};
pub use crate::schedule::config::{
    AnimationConfig, AnimationFormat, CRF_CHOICES, ExportSettings, FPS_CHOICES,
    FRAMES_PER_DAY_CHOICES, RESOLUTION_PRESETS, Resolution, UNTITLED_BASENAME, output_file_name,
    validate_frames_per_day,
};
pub use crate::schedule::run::{AnimationRun, RunMode, RunState};
pub use crate::schedule::scheduler::{
    FrameSequence, Sample, ScheduledFrame, SunBounds, apply_skip_nights, build_sequence,
    derive_dates, derive_hours, derive_offsets, number_frames, schedule, timestamp_for,
};
pub use crate::session::Session;
pub use crate::visibility::VisibilityEngine;
pub use crate::window::time_window::{
    DATES_PLACEHOLDER, DateRange, HOURS_PLACEHOLDER, HourRange, TimeWindow, WindowKind,
};
