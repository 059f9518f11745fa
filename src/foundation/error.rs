/// Convenience result type used across dayglow.
pub type DayglowResult<T> = Result<T, DayglowError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum DayglowError {
    /// Invalid user-provided pixel, palette, or cycle data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Inconsistent or unresolvable schedule state.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Errors while loading, saving, importing, or exporting world data.
    #[error("storage error: {0}")]
    Storage(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DayglowError {
    /// Build a [`DayglowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DayglowError::Schedule`] value.
    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    /// Build a [`DayglowError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
