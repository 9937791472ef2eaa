use super::*;
use crate::schedule::config::Resolution;
use std::cell::RefCell;

struct ScriptedRunner {
    report: ProcessReport,
    seen: RefCell<Vec<EncoderCommand>>,
}

impl ScriptedRunner {
    fn exiting(code: i32, stderr: &str) -> Self {
        Self {
            report: ProcessReport {
                code: Some(code),
                success: code == 0,
                stderr: stderr.to_owned(),
            },
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl ProcessRunner for &ScriptedRunner {
    fn run(&self, cmd: &EncoderCommand, _timeout: Option<Duration>) -> LitResult<ProcessReport> {
        self.seen.borrow_mut().push(cmd.clone());
        Ok(self.report.clone())
    }
}

fn request(format: AnimationFormat, output: &str) -> EncodeRequest {
    EncodeRequest {
        input_pattern: PathBuf::from("frames/%09d.jpg"),
        settings: ExportSettings {
            format,
            resolution: Resolution::new(1920, 1080),
            frames_per_second: 25,
            constant_rate_factor: 20,
        },
        output: PathBuf::from(output),
    }
}

fn args_of(cmd: &EncoderCommand) -> Vec<String> {
    cmd.args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn mp4_command_uses_x264_faststart() {
    let cmd = build_command(Path::new("ffmpeg"), &request(AnimationFormat::Mp4, "out.mp4"));
    assert_eq!(
        args_of(&cmd),
        vec![
            "-y", "-r", "25", "-f", "image2", "-s", "1920x1080", "-i", "frames/%09d.jpg", "-c:v",
            "libx264", "-crf", "20", "-pix_fmt", "yuv420p", "-movflags", "+faststart", "out.mp4",
        ]
    );
}

#[test]
fn gif_command_uses_palette_filter() {
    let cmd = build_command(Path::new("ffmpeg"), &request(AnimationFormat::Gif, "out.gif"));
    let args = args_of(&cmd);
    assert_eq!(args[9], "-filter_complex");
    assert_eq!(args[10], GIF_FILTER_GRAPH);
    assert_eq!(args.last().unwrap(), "out.gif");
    assert!(!args.iter().any(|a| a == "-crf"));
}

#[test]
fn display_quotes_arguments_with_spaces() {
    let cmd = build_command(Path::new("ffmpeg"), &request(AnimationFormat::Gif, "my anim.gif"));
    let shown = cmd.to_string();
    assert!(shown.starts_with("\"ffmpeg\" -y"));
    assert!(shown.ends_with("\"my anim.gif\""));
}

#[test]
fn non_zero_exit_is_an_encoder_error() {
    let runner = ScriptedRunner::exiting(1, "Unknown encoder 'libx264'");
    let enc = FfmpegEncoder::with_program("ffmpeg").with_runner(&runner);
    let err = enc
        .encode(&request(AnimationFormat::Mp4, "target/unit_ffmpeg/out.mp4"))
        .unwrap_err();
    assert!(matches!(err, LitError::Encoder(_)));
    assert!(err.is_recoverable());
    assert!(err.to_string().contains("Unknown encoder"));
    assert_eq!(runner.seen.borrow().len(), 1);
}

#[test]
fn zero_exit_succeeds() {
    let runner = ScriptedRunner::exiting(0, "");
    let enc = FfmpegEncoder::with_program("ffmpeg").with_runner(&runner);
    enc.encode(&request(AnimationFormat::Gif, "target/unit_ffmpeg/ok.gif"))
        .unwrap();
    let seen = runner.seen.borrow();
    assert_eq!(seen[0].program, PathBuf::from("ffmpeg"));
}

#[test]
fn invalid_settings_never_reach_the_runner() {
    let runner = ScriptedRunner::exiting(0, "");
    let enc = FfmpegEncoder::with_program("ffmpeg").with_runner(&runner);
    let mut req = request(AnimationFormat::Mp4, "target/unit_ffmpeg/odd.mp4");
    req.settings.resolution = Resolution::new(853, 480);
    assert!(matches!(enc.encode(&req), Err(LitError::Validation(_))));
    assert!(runner.seen.borrow().is_empty());
}

#[test]
fn missing_program_is_an_encoder_error() {
    let enc = FfmpegEncoder::with_program("target/definitely-not-ffmpeg-xyz");
    let err = enc
        .encode(&request(AnimationFormat::Gif, "target/unit_ffmpeg/missing.gif"))
        .unwrap_err();
    assert!(matches!(err, LitError::Encoder(_)));
}

#[cfg(unix)]
#[test]
fn ensure_executable_sets_exec_bits_once() {
    use std::os::unix::fs::PermissionsExt as _;
    let dir = PathBuf::from("target").join("unit_ffmpeg_exec");
    std::fs::create_dir_all(&dir).unwrap();
    let bin = dir.join("fake-ffmpeg");
    std::fs::write(&bin, b"#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o644)).unwrap();

    ensure_executable(&bin).unwrap();
    ensure_executable(&bin).unwrap();
    let mode = std::fs::metadata(&bin).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);

    // Bare names are resolved through PATH and left alone.
    ensure_executable(Path::new("ffmpeg")).unwrap();
}

#[cfg(unix)]
#[test]
fn ensure_executable_leaves_partly_executable_files_alone() {
    use std::os::unix::fs::PermissionsExt as _;
    let dir = PathBuf::from("target").join("unit_ffmpeg_exec_partial");
    std::fs::create_dir_all(&dir).unwrap();
    let bin = dir.join("fake-ffmpeg");
    std::fs::write(&bin, b"#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o750)).unwrap();

    ensure_executable(&bin).unwrap();
    let mode = std::fs::metadata(&bin).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o750);
}

#[cfg(unix)]
#[test]
fn system_runner_times_out() {
    let cmd = EncoderCommand {
        program: PathBuf::from("sleep"),
        args: vec![OsString::from("5")],
    };
    let err = SystemRunner
        .run(&cmd, Some(Duration::from_millis(100)))
        .unwrap_err();
    assert!(err.to_string().contains("did not finish"));
}
