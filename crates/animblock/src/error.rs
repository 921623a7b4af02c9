//! Animation error types

use thiserror::Error;

/// Errors raised while building, recording, or controlling animation blocks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Block created with a zero duration
    #[error("animation duration must be greater than zero")]
    ZeroDuration,

    /// Block created without any target
    #[error("animation block needs at least one target")]
    NoTargets,

    /// Write to a property the target does not have
    #[error("target {target} has no property `{property}`")]
    UnknownProperty { target: usize, property: String },

    /// Write of NaN or an infinite value
    #[error("non-finite value {value} assigned to `{property}` on target {target}")]
    NonFiniteValue {
        target: usize,
        property: String,
        value: f32,
    },

    /// Stand-in requested for a target index the block does not have
    #[error("target index {index} out of range ({count} targets)")]
    TargetOutOfRange { index: usize, count: usize },

    /// The block finished, was cancelled, or never existed
    #[error("animation block is no longer live")]
    BlockNotFound,
}

/// Errors raised while loading scheduler configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("target_fps must be greater than zero")]
    ZeroFps,
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
