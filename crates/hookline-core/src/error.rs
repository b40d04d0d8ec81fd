//! Error types for the hook detection pipeline

use thiserror::Error;

/// Errors surfaced by the detection pipeline.
///
/// Degenerate feature channels (zero variance) are not errors: they
/// contribute nothing to the fused curve and are logged at debug level.
/// An absence of peaks is likewise a valid empty result.
#[derive(Debug, Error)]
pub enum HookError {
    /// The waveform cannot be framed (empty, or shorter than one frame).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configuration value was rejected during validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, HookError>;
