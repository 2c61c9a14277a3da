use thiserror::Error;

/// Errors that can occur when building a histogram from a set of parameters.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error("lowest discernible value must be at least 1 and the highest trackable value at least twice the lowest")]
    InvalidRange,
    #[error("resolution is outside of the supported range")]
    InvalidResolution,
    #[error("counts array length exceeds the supported maximum")]
    CountsOverflow,
}

/// Errors that can occur when recording into or querying a histogram.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("histogram contains no samples")]
    Empty,
    #[error("value is outside of the trackable range")]
    ValueOutOfRange,
    #[error("counter would overflow")]
    CounterOverflow,
    #[error("percentile must be in the range 0.0..=100.0")]
    InvalidPercentile,
    #[error("iteration step must be positive and a log base greater than 1.0")]
    InvalidStep,
    #[error("histogram could not be resized: {0}")]
    Resize(#[from] BuildError),
    #[error("histogram could not allocate counters for a resize")]
    AllocationFailed,
}
