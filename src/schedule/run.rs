use crate::foundation::error::{LitError, LitResult};
use crate::layer::tagged::TaggedLayer;
use crate::schedule::config::AnimationConfig;
use crate::schedule::scheduler::{
    FrameSequence, SunBounds, apply_skip_nights, build_sequence, derive_dates, derive_hours,
    schedule,
};

/// Phase of one animation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// No run in progress.
    Idle,
    /// Configuration accepted, nothing scheduled yet.
    Configuring,
    /// Frame sequence built.
    Scheduled,
    /// Visiting frames without capturing them.
    Previewing,
    /// Visiting frames and capturing each one.
    Exporting,
}

/// What a started run does with each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Update the viewport only.
    Preview,
    /// Capture every frame for encoding.
    Export,
}

/// State machine `Idle -> Configuring -> Scheduled -> (Previewing | Exporting) -> Idle`.
///
/// Calling an operation in the wrong state is a validation error and leaves the state unchanged.
#[derive(Debug)]
pub struct AnimationRun {
    state: RunState,
    config: Option<AnimationConfig>,
    sequence: Option<FrameSequence>,
}

impl Default for AnimationRun {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationRun {
    /// A run in [`RunState::Idle`].
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            config: None,
            sequence: None,
        }
    }

    /// Current phase.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Accepted configuration, once configured.
    pub fn config(&self) -> Option<&AnimationConfig> {
        self.config.as_ref()
    }

    /// Built sequence, once scheduled.
    pub fn sequence(&self) -> Option<&FrameSequence> {
        self.sequence.as_ref()
    }

    /// Accept `config`. Out-of-range frames-per-day fails before anything is stored.
    pub fn configure(&mut self, config: AnimationConfig) -> LitResult<()> {
        self.require_state(RunState::Idle, "configure")?;
        config.validate()?;
        self.config = Some(config);
        self.state = RunState::Configuring;
        Ok(())
    }

    /// Build the frame sequence for `layers`.
    pub fn schedule(
        &mut self,
        layers: &[TaggedLayer],
        reference_year: i32,
        utc_offset: i64,
    ) -> LitResult<&FrameSequence> {
        self.require_state(RunState::Configuring, "schedule")?;
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| LitError::validation("animation run has no configuration"))?;

        let dates = derive_dates(layers);
        let hours = derive_hours(config.frames_per_day)?;
        let samples = build_sequence(&dates, &hours);
        let sequence = schedule(&samples, reference_year, utc_offset)?;
        tracing::debug!(
            dates = dates.len(),
            per_day = hours.len(),
            frames = sequence.len(),
            "scheduled animation"
        );

        self.state = RunState::Scheduled;
        Ok(self.sequence.insert(sequence))
    }

    /// Drop night frames when the configuration asks for it. Stays in [`RunState::Scheduled`].
    pub fn skip_nights(
        &mut self,
        bounds_at: impl FnMut(i64) -> SunBounds,
    ) -> LitResult<&FrameSequence> {
        self.require_state(RunState::Scheduled, "filter")?;
        let skip = self.config.as_ref().is_some_and(|c| c.skip_nights);
        let sequence = std::mem::take(&mut self.sequence).unwrap_or_default();
        let before = sequence.len();
        let sequence = apply_skip_nights(sequence, skip, bounds_at);
        if skip {
            tracing::debug!(dropped = before - sequence.len(), "skipped night frames");
        }
        Ok(self.sequence.insert(sequence))
    }

    /// Enter preview or export.
    pub fn start(&mut self, mode: RunMode) -> LitResult<&FrameSequence> {
        self.require_state(RunState::Scheduled, "start")?;
        self.state = match mode {
            RunMode::Preview => RunState::Previewing,
            RunMode::Export => RunState::Exporting,
        };
        self.sequence
            .as_ref()
            .ok_or_else(|| LitError::validation("animation run has no sequence"))
    }

    /// Return to [`RunState::Idle`] from any state, dropping the sequence.
    pub fn finish(&mut self) {
        self.state = RunState::Idle;
        self.config = None;
        self.sequence = None;
    }

    fn require_state(&self, want: RunState, op: &str) -> LitResult<()> {
        if self.state != want {
            return Err(LitError::validation(format!(
                "cannot {op} an animation run in state {:?} (expected {want:?})",
                self.state
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/run.rs"]
mod tests;
