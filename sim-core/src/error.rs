use thiserror::Error;

/// Errors raised while validating or loading a [`crate::config::Config`].
///
/// None of these are fatal to a running forest: callers are expected to
/// log them and fall back to defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested number of trees is not a positive integer within bounds.
    #[error("invalid tree count {input:?}: expected an integer in 1..={max}")]
    InvalidTreeCount { input: String, max: usize },
    /// A `min`/`max` pair is empty or inverted.
    #[error("{name} range is empty: min {min} must be below max {max}")]
    InvalidRange { name: &'static str, min: f32, max: f32 },
    /// A per-frame probability is outside `[0, 1]`.
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f32 },
    /// A canvas dimension or scale is not strictly positive and finite.
    #[error("{name} must be positive and finite, got {value}")]
    InvalidDimension { name: &'static str, value: f32 },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
