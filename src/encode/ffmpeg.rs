use std::ffi::OsString;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::foundation::error::{LitError, LitResult};
use crate::schedule::config::{AnimationFormat, ExportSettings};

/// Environment variable naming the `ffmpeg` executable to use.
pub const FFMPEG_ENV: &str = "LAYERS_IN_TIME_FFMPEG";

/// Filter graph for a single-input GIF with a generated palette.
pub const GIF_FILTER_GRAPH: &str = "[0:v] split [a][b];[a] palettegen [p];[b][p] paletteuse";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Inputs for one encoder invocation.
#[derive(Clone, Debug)]
pub struct EncodeRequest {
    /// `%09d` pattern of the numbered frames.
    pub input_pattern: PathBuf,
    /// Format, size, rate and quality.
    pub settings: ExportSettings,
    /// Output file.
    pub output: PathBuf,
}

/// A program plus its argument vector. No shell is involved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderCommand {
    /// Executable.
    pub program: PathBuf,
    /// Arguments, in order.
    pub args: Vec<OsString>,
}

impl fmt::Display for EncoderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Build the fixed command line for `req`.
///
/// Both formats read `image2` frames at the requested rate and size and overwrite the output.
/// GIF goes through a palettegen/paletteuse pass; MP4 is libx264 + yuv420p with `+faststart`.
pub fn build_command(program: &Path, req: &EncodeRequest) -> EncoderCommand {
    let s = &req.settings;
    let fps = s.frames_per_second.to_string();
    let size = s.resolution.to_string();
    let mut args: Vec<OsString> = [
        "-y",
        "-r",
        fps.as_str(),
        "-f",
        "image2",
        "-s",
        size.as_str(),
        "-i",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(req.input_pattern.clone().into_os_string());

    match s.format {
        AnimationFormat::Gif => {
            args.extend(["-filter_complex", GIF_FILTER_GRAPH].map(OsString::from));
        }
        AnimationFormat::Mp4 => {
            let crf = s.constant_rate_factor.to_string();
            args.extend(
                [
                    "-c:v",
                    "libx264",
                    "-crf",
                    crf.as_str(),
                    "-pix_fmt",
                    "yuv420p",
                    "-movflags",
                    "+faststart",
                ]
                .map(OsString::from),
            );
        }
    }
    args.push(req.output.clone().into_os_string());

    EncoderCommand {
        program: program.to_path_buf(),
        args,
    }
}

/// Outcome of a finished process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessReport {
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
    /// `true` for a zero exit status.
    pub success: bool,
    /// Captured standard error.
    pub stderr: String,
}

/// Runs an [`EncoderCommand`] to completion.
///
/// Implementations return `Err` only when the process could not be run or waited on. A non-zero
/// exit is reported through [`ProcessReport::success`].
pub trait ProcessRunner {
    /// Run `cmd`, killing it once `timeout` elapses.
    fn run(&self, cmd: &EncoderCommand, timeout: Option<Duration>) -> LitResult<ProcessReport>;
}

/// [`ProcessRunner`] backed by `std::process`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, cmd: &EncoderCommand, timeout: Option<Duration>) -> LitResult<ProcessReport> {
        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                LitError::encoder(format!(
                    "failed to spawn '{}' (is ffmpeg installed?): {e}",
                    cmd.program.display()
                ))
            })?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| LitError::encoder("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok::<_, std::io::Error>(bytes)
        });

        let started = Instant::now();
        let status = loop {
            let polled = child
                .try_wait()
                .map_err(|e| LitError::encoder(format!("failed to wait for ffmpeg: {e}")))?;
            if let Some(status) = polled {
                break status;
            }
            if let Some(limit) = timeout
                && started.elapsed() >= limit
            {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LitError::encoder(format!(
                    "ffmpeg did not finish within {:.1}s and was killed",
                    limit.as_secs_f64()
                )));
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| LitError::encoder("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| LitError::encoder(format!("ffmpeg stderr read failed: {e}")))?;

        Ok(ProcessReport {
            code: status.code(),
            success: status.success(),
            stderr: String::from_utf8_lossy(&stderr_bytes).trim().to_owned(),
        })
    }
}

/// Encoder adapter assembling numbered frames into one animation file.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder<R = SystemRunner> {
    program: PathBuf,
    runner: R,
    timeout: Option<Duration>,
}

impl FfmpegEncoder<SystemRunner> {
    /// Use `$LAYERS_IN_TIME_FFMPEG` when set, else `ffmpeg` from `PATH`.
    pub fn locate() -> Self {
        let program = std::env::var_os(FFMPEG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("ffmpeg"));
        Self::with_program(program)
    }

    /// Use an explicit executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            runner: SystemRunner,
            timeout: None,
        }
    }
}

impl<R: ProcessRunner> FfmpegEncoder<R> {
    /// Swap the process runner.
    pub fn with_runner<R2: ProcessRunner>(self, runner: R2) -> FfmpegEncoder<R2> {
        FfmpegEncoder {
            program: self.program,
            runner,
            timeout: self.timeout,
        }
    }

    /// Kill the encoder after `timeout` and report an encoder error.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Executable this encoder runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether the configured executable answers `-version`.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    /// Command line [`Self::encode`] would run for `req`.
    pub fn command_for(&self, req: &EncodeRequest) -> EncoderCommand {
        build_command(&self.program, req)
    }

    /// Run the encoder. Failures come back as [`LitError::Encoder`].
    #[tracing::instrument(skip(self, req), fields(format = %req.settings.format, output = %req.output.display()))]
    pub fn encode(&self, req: &EncodeRequest) -> LitResult<()> {
        req.settings.validate()?;
        ensure_parent_dir(&req.output)?;
        ensure_executable(&self.program)?;

        let cmd = self.command_for(req);
        tracing::debug!(command = %cmd, "running encoder");
        let report = self.runner.run(&cmd, self.timeout)?;
        if !report.success {
            let status = report
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_owned());
            tracing::warn!(%status, "encoder failed");
            return Err(LitError::encoder(format!(
                "command failed with status {status}: {cmd}: {}",
                report.stderr
            )));
        }
        tracing::info!("encoded animation");
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> LitResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Make a bundled encoder binary executable when it has no exec bit at all. Idempotent.
///
/// Bare program names resolved through `PATH` and missing files are left alone.
pub fn ensure_executable(program: &Path) -> LitResult<()> {
    if program.components().count() < 2 || !program.is_file() {
        return Ok(());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        let meta = std::fs::metadata(program)
            .with_context(|| format!("failed to stat '{}'", program.display()))?;
        let mut perms = meta.permissions();
        let mode = perms.mode();
        if mode & 0o111 == 0 {
            perms.set_mode(mode | 0o111);
            std::fs::set_permissions(program, perms).with_context(|| {
                format!("failed to mark '{}' executable", program.display())
            })?;
        }
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
