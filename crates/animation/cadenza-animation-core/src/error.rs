//! Error types for animation evaluation

use cadenza_api_core::{PathError, ValueKind};

/// Result alias used across the crate.
pub type Result<T, E = AnimationError> = std::result::Result<T, E>;

/// Errors raised while building, binding or driving animations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimationError {
    /// Clip data failed validation
    #[error("Invalid clip '{clip}': {reason}")]
    InvalidClip { clip: String, reason: String },

    /// Clip not registered on the component
    #[error("Clip not found: {name}")]
    ClipNotFound { name: String },

    /// Explicit keyframe times go backwards
    #[error("Keyframes of '{property}' are not ordered: {previous} then {next}")]
    NonMonotonicKeyframes {
        property: String,
        previous: f64,
        next: f64,
    },

    /// Easing parameter outside its domain (zero rate, non-positive period)
    #[error("Invalid easing: {reason}")]
    InvalidEasing { reason: String },

    /// Property path could not be parsed or resolved
    #[error("Invalid property path '{path}': {source}")]
    InvalidPath { path: String, source: PathError },

    /// Target does not expose the property
    #[error("Property not found: {name}")]
    PropertyNotFound { name: String },

    /// Value type mismatch
    #[error("Value type mismatch on '{name}': expected {expected:?}, got {actual:?}")]
    ValueTypeMismatch {
        name: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// update() called before start_with_target()
    #[error("Action '{action}' updated before start_with_target")]
    ActionNotStarted { action: &'static str },

    /// Composite action built from nothing
    #[error("Composite action '{action}' needs at least one child")]
    EmptyComposite { action: &'static str },

    /// An event handler rejected the event
    #[error("Event handler '{func}' failed: {reason}")]
    EventHandler { func: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl AnimationError {
    pub fn invalid_easing(reason: impl Into<String>) -> Self {
        Self::InvalidEasing {
            reason: reason.into(),
        }
    }

    /// Errors that only affect one curve, one action or one event; callers can
    /// log them and keep ticking.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PropertyNotFound { .. }
                | Self::ValueTypeMismatch { .. }
                | Self::EventHandler { .. }
                | Self::ClipNotFound { .. }
        )
    }

    /// Get error category for logging/metrics
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidClip { .. }
            | Self::ClipNotFound { .. }
            | Self::NonMonotonicKeyframes { .. } => "data",
            Self::InvalidEasing { .. } => "easing",
            Self::InvalidPath { .. }
            | Self::PropertyNotFound { .. }
            | Self::ValueTypeMismatch { .. } => "binding",
            Self::ActionNotStarted { .. } | Self::EmptyComposite { .. } => "action",
            Self::EventHandler { .. } => "event",
            Self::SerializationError { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let err = AnimationError::invalid_easing("rate must be non-zero");
        assert_eq!(err.category(), "easing");
        assert!(!err.is_recoverable());

        let err = AnimationError::PropertyNotFound { name: "x".into() };
        assert_eq!(err.category(), "binding");
        assert!(err.is_recoverable());
    }

    #[test]
    fn display_messages() {
        let err = AnimationError::NonMonotonicKeyframes {
            property: "x".into(),
            previous: 1.0,
            next: 0.5,
        };
        assert_eq!(err.to_string(), "Keyframes of 'x' are not ordered: 1 then 0.5");
        let err = AnimationError::ActionNotStarted { action: "Sequence" };
        assert!(err.to_string().contains("Sequence"));
    }
}
