/// Convenience result type used across reelflow.
pub type FlowResult<T> = Result<T, FlowError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Unresolved cue waits are not errors: they are reported as
/// [`Diagnostic`](crate::Diagnostic)s when the scene ends.
#[derive(thiserror::Error, Debug)]
pub enum FlowError {
    /// A computed signal was re-entered while it was being evaluated.
    #[error("dependency cycle detected: {0}")]
    CycleDetected(String),

    /// A duration was negative or not finite.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// A joined child was cancelled while the scheduler fails groups on child cancellation.
    #[error("group child failure: {0}")]
    GroupChildFailure(String),

    /// Invalid user-provided configuration or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A thread kept resuming within one step without waiting on anything.
    #[error("thread stalled: {0}")]
    Stalled(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowError {
    /// Build a [`FlowError::CycleDetected`] value.
    pub fn cycle(msg: impl Into<String>) -> Self {
        Self::CycleDetected(msg.into())
    }

    /// Build a [`FlowError::InvalidDuration`] value.
    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration(msg.into())
    }

    /// Build a [`FlowError::GroupChildFailure`] value.
    pub fn group_child_failure(msg: impl Into<String>) -> Self {
        Self::GroupChildFailure(msg.into())
    }

    /// Build a [`FlowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlowError::Stalled`] value.
    pub fn stalled(msg: impl Into<String>) -> Self {
        Self::Stalled(msg.into())
    }

    /// Build a [`FlowError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors that abort a run rather than a single construction.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CycleDetected(_) | Self::GroupChildFailure(_) | Self::Stalled(_)
        )
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

/// Validate a user-provided duration in seconds. Zero is allowed (instantaneous).
pub(crate) fn check_duration(what: &str, secs: f64) -> FlowResult<f64> {
    if !secs.is_finite() {
        return Err(FlowError::invalid_duration(format!(
            "{what} duration must be finite, got {secs}"
        )));
    }
    if secs < 0.0 {
        return Err(FlowError::invalid_duration(format!(
            "{what} duration must be >= 0, got {secs}"
        )));
    }
    Ok(secs)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
