/// Convenience result type used across Cardmotion.
pub type CardmotionResult<T> = Result<T, CardmotionError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CardmotionError {
    /// Invalid user-provided or stage data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while building or scrubbing timelines and tweens.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while dispatching gestures or assembling sequences.
    #[error("sequence error: {0}")]
    Sequence(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardmotionError {
    /// Build a [`CardmotionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CardmotionError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`CardmotionError::Sequence`] value.
    pub fn sequence(msg: impl Into<String>) -> Self {
        Self::Sequence(msg.into())
    }

    /// Build a [`CardmotionError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
