use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{LitError, LitResult};
use crate::schedule::scheduler::{FrameSequence, ScheduledFrame};

/// Image format of captured frames.
pub const FRAME_EXTENSION: &str = "jpg";

/// File name of the frame with output index `index`.
pub fn frame_file_name(index: u64) -> String {
    format!("{index:09}.{FRAME_EXTENSION}")
}

/// Scratch directory receiving `000000000.jpg`, `000000001.jpg`, ...
///
/// Indices count captured frames, so the run is contiguous whatever was skipped. On drop the
/// captured frames are removed, and the directory too if it was created here, unless
/// [`FrameDir::keep`] was called. Nothing else in the directory is touched.
#[derive(Debug)]
pub struct FrameDir {
    path: PathBuf,
    next: u64,
    keep: bool,
    created: bool,
}

impl FrameDir {
    /// Use `path`, creating it if missing. An existing directory must be empty.
    pub fn create(path: impl Into<PathBuf>) -> LitResult<Self> {
        let path = path.into();
        let created = !path.exists();
        if !created && !is_empty_dir(&path)? {
            return Err(LitError::validation(format!(
                "frame directory '{}' is not an empty directory",
                path.display()
            )));
        }
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create frame directory '{}'", path.display()))?;
        Ok(Self {
            path,
            next: 0,
            keep: false,
            created,
        })
    }

    /// Per-process directory under the system temp dir. Leftovers from an earlier run with the
    /// same id are cleared first.
    pub fn in_temp_dir() -> LitResult<Self> {
        let path = std::env::temp_dir()
            .join(format!("layers_in_time_frames_{}", std::process::id()));
        if path.exists() {
            std::fs::remove_dir_all(&path).with_context(|| {
                format!("failed to clear frame directory '{}'", path.display())
            })?;
        }
        Self::create(path)
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `%09d` input pattern understood by the encoder.
    pub fn input_pattern(&self) -> PathBuf {
        self.path.join(format!("%09d.{FRAME_EXTENSION}"))
    }

    /// Frames captured so far.
    pub fn frame_count(&self) -> u64 {
        self.next
    }

    /// Path the next captured frame will be written to.
    pub fn next_frame_path(&self) -> PathBuf {
        self.path.join(frame_file_name(self.next))
    }

    /// Let `render` write the next frame, then advance the index.
    ///
    /// The index only advances when `render` succeeds.
    pub fn capture(
        &mut self,
        render: impl FnOnce(&Path) -> LitResult<()>,
    ) -> LitResult<PathBuf> {
        let path = self.next_frame_path();
        render(&path)?;
        self.next += 1;
        Ok(path)
    }

    /// Leave the frames on disk when this value is dropped.
    pub fn keep(&mut self) {
        self.keep = true;
    }

    /// Remove the captured frames now, and the directory if it was created here.
    pub fn remove(mut self) -> LitResult<()> {
        self.keep = true;
        self.clean_up().with_context(|| {
            format!("failed to remove frame directory '{}'", self.path.display())
        })?;
        Ok(())
    }

    fn clean_up(&self) -> std::io::Result<()> {
        for index in 0..self.next {
            match std::fs::remove_file(self.path.join(frame_file_name(index))) {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => return Err(err),
                _ => {}
            }
        }
        if self.created {
            std::fs::remove_dir(&self.path)?;
        }
        Ok(())
    }
}

impl Drop for FrameDir {
    fn drop(&mut self) {
        if !self.keep {
            let _ = self.clean_up();
        }
    }
}

fn is_empty_dir(path: &Path) -> LitResult<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    let mut entries = std::fs::read_dir(path)
        .with_context(|| format!("failed to read frame directory '{}'", path.display()))?;
    Ok(entries.next().is_none())
}

/// Capture one frame per entry of `sequence` into `dir`, in order.
///
/// Returns the written paths.
pub fn export_frames(
    sequence: &FrameSequence,
    dir: &mut FrameDir,
    mut render: impl FnMut(&ScheduledFrame, &Path) -> LitResult<()>,
) -> LitResult<Vec<PathBuf>> {
    sequence
        .iter()
        .map(|frame| dir.capture(|path| render(frame, path)))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/frames.rs"]
mod tests;
