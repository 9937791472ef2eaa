/// Convenience result type used across the crate.
pub type LitResult<T> = Result<T, LitError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Malformed time-window strings are not represented here: they parse to
/// [`TimeWindow::None`](crate::TimeWindow::None) instead.
#[derive(thiserror::Error, Debug)]
pub enum LitError {
    /// Caller passed arguments of the wrong shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// Animation configuration is out of range. Raised before any side effect.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external encoder could not be started, failed, or timed out.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// Errors when serializing or deserializing interchange data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LitError {
    /// Build a [`LitError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LitError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`LitError::Encoder`] value.
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Build a [`LitError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for failures the caller can report and move past.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Encoder(_) | Self::Serde(_) | Self::Other(_))
    }
}

impl From<serde_json::Error> for LitError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
