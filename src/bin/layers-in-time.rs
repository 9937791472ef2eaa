use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike as _};
use clap::{ArgAction, Parser, Subcommand};
use layers_in_time::{
    AnimationConfig, AnimationFormat, AnimationOutcome, AnimationRun,
    ExportOptions, ExportSettings, FfmpegEncoder, LayerStore as _, MemoryHost, MemoryLayers,
    REFERENCE_YEAR, Resolution, TaggedLayer, TimeOfDay, VisibilityEngine, export_json,
    import_json,
};

/// Widest real-world zone offset, UTC+14, in seconds.
const MAX_UTC_OFFSET: i64 = 14 * 3600;

#[derive(Parser, Debug)]
#[command(name = "layers-in-time", version)]
struct Cli {
    /// Log more (`-v` info, `-vv` debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print which time layers are visible at an instant.
    Check(CheckArgs),
    /// Print the frames an animation would visit.
    Schedule(ScheduleArgs),
    /// Re-export time-layer JSON, dropping invalid windows.
    Normalize(NormalizeArgs),
    /// Render synthetic frames and encode a GIF or MP4 (requires `ffmpeg`).
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Time-layer JSON.
    #[arg(long)]
    layers: PathBuf,

    /// Instant, `YYYY-MM-DDTHH:MM[:SS]`.
    #[arg(long, value_parser = parse_instant)]
    at: NaiveDateTime,
}

#[derive(Parser, Debug)]
struct ScheduleArgs {
    /// Time-layer JSON.
    #[arg(long)]
    layers: PathBuf,

    /// Samples per simulated day.
    #[arg(long, default_value_t = 24)]
    frames_per_day: u32,

    /// Model time zone offset in seconds (-50400..=50400).
    #[arg(
        long,
        default_value_t = 0,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i64).range(-MAX_UTC_OFFSET..=MAX_UTC_OFFSET)
    )]
    utc_offset: i64,
}

#[derive(Parser, Debug)]
struct NormalizeArgs {
    /// Input time-layer JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output time-layer JSON.
    #[arg(long)]
    out: PathBuf,

    /// Write compact JSON.
    #[arg(long)]
    compact: bool,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Time-layer JSON.
    #[arg(long)]
    layers: PathBuf,

    /// Output GIF or MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// `GIF` or `MP4`; defaults to the output extension.
    #[arg(long)]
    format: Option<AnimationFormat>,

    /// Frame size, `WxH`.
    #[arg(long, default_value = "1280x720")]
    resolution: Resolution,

    /// Samples per simulated day.
    #[arg(long, default_value_t = 24)]
    frames_per_day: u32,

    /// Playback rate.
    #[arg(long, default_value_t = 24)]
    fps: u32,

    /// x264 constant rate factor (MP4 only).
    #[arg(long, default_value_t = 23)]
    crf: u32,

    /// Only keep frames between sunrise and sunset.
    #[arg(long)]
    skip_nights: bool,

    /// Daily sunrise, `HH:MM`.
    #[arg(long, default_value = "06:00", value_parser = parse_clock)]
    sunrise: TimeOfDay,

    /// Daily sunset, `HH:MM`.
    #[arg(long, default_value = "18:00", value_parser = parse_clock)]
    sunset: TimeOfDay,

    /// Model time zone offset in seconds (-50400..=50400).
    #[arg(
        long,
        default_value_t = 0,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i64).range(-MAX_UTC_OFFSET..=MAX_UTC_OFFSET)
    )]
    utc_offset: i64,

    /// Keep the frame directory after encoding.
    #[arg(long)]
    keep_frames: bool,

    /// Frame directory, missing or empty (defaults to a temp directory).
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// `ffmpeg` executable (defaults to `$LAYERS_IN_TIME_FFMPEG`, then `PATH`).
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Kill the encoder after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Schedule(args) => cmd_schedule(args),
        Command::Normalize(args) => cmd_normalize(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_instant(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM[:SS]: {e}"))
}

fn parse_clock(s: &str) -> Result<TimeOfDay, String> {
    let t = NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))?;
    TimeOfDay::new(t.hour(), t.minute(), 0).ok_or_else(|| format!("invalid time '{s}'"))
}

fn read_layers(path: &Path) -> anyhow::Result<MemoryLayers> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read layers '{}'", path.display()))?;
    let mut store = MemoryLayers::new();
    import_json(&mut store, &json).with_context(|| format!("parse layers '{}'", path.display()))?;
    Ok(store)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let mut store = read_layers(&args.layers)?;
    let updated = VisibilityEngine::update_all(&mut store, args.at);

    for layer in TaggedLayer::load_all(&store) {
        if !layer.is_time_layer() {
            continue;
        }
        let id = layer.id();
        let name = store.layer_name(id).unwrap_or_default();
        let state = if store.is_visible(id) { "visible" } else { "hidden" };
        let window = if layer.is_dates_layer() {
            layer.dates().to_string()
        } else {
            layer.hours().to_string()
        };
        println!("{name}\t{window}\t{state}");
    }
    eprintln!("{updated} time layer(s) at {}", args.at);
    Ok(())
}

fn cmd_schedule(args: ScheduleArgs) -> anyhow::Result<()> {
    let store = read_layers(&args.layers)?;
    let layers = TaggedLayer::load_all(&store);

    let mut run = AnimationRun::new();
    run.configure(AnimationConfig {
        frames_per_day: args.frames_per_day,
        skip_nights: false,
    })?;
    let sequence = run.schedule(&layers, REFERENCE_YEAR, args.utc_offset)?;
    for (i, frame) in sequence.iter().enumerate() {
        println!(
            "{i}\t{} {}\t{}",
            frame.sample.date, frame.sample.time, frame.timestamp
        );
    }
    eprintln!("{} frame(s)", sequence.len());
    Ok(())
}

fn cmd_normalize(args: NormalizeArgs) -> anyhow::Result<()> {
    let store = read_layers(&args.in_path)?;
    let json = export_json(&store, !args.compact)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, json)
        .with_context(|| format!("write layers '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let store = read_layers(&args.layers)?;
    let format = match args.format {
        Some(f) => f,
        None => args
            .out
            .extension()
            .and_then(|e| e.to_str())
            .map(str::parse::<AnimationFormat>)
            .transpose()?
            .unwrap_or_default(),
    };

    let start = NaiveDate::from_ymd_opt(REFERENCE_YEAR, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .context("build start time")?;
    let mut host =
        MemoryHost::at(store, start, args.utc_offset).with_daylight(args.sunrise, args.sunset);

    let encoder = match args.ffmpeg {
        Some(program) => FfmpegEncoder::with_program(program),
        None => FfmpegEncoder::locate(),
    }
    .with_timeout(args.timeout_secs.map(Duration::from_secs));
    if !encoder.is_available() {
        anyhow::bail!(
            "'{}' is not runnable; install ffmpeg or pass --ffmpeg",
            encoder.program().display()
        );
    }

    let config = AnimationConfig {
        frames_per_day: args.frames_per_day,
        skip_nights: args.skip_nights,
    };
    let opts = ExportOptions {
        settings: ExportSettings {
            format,
            resolution: args.resolution,
            frames_per_second: args.fps,
            constant_rate_factor: args.crf,
        },
        output: args.out,
        frames_dir: args.frames_dir,
        keep_frames: args.keep_frames,
    };

    let outcome = layers_in_time::export(&mut host, &config, &opts, &encoder, |_| true)?;
    match outcome {
        AnimationOutcome::Exported { output, frames } => {
            eprintln!("wrote {} ({frames} frames)", output.display());
        }
        AnimationOutcome::NothingToAnimate => {
            eprintln!("no time layers to animate");
        }
        AnimationOutcome::AllFramesSkipped => {
            eprintln!("every frame falls outside daylight; nothing exported");
        }
        other => eprintln!("export stopped: {other:?}"),
    }
    Ok(())
}
