use fft_cpu::FftError;

/// Result type for every simulation stage
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by the simulation chain.
///
/// Every variant names the stage that failed so a sweep failure can be traced
/// back to the offending parameter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("[{stage}] invalid configuration: {param} {reason}")]
    InvalidConfig {
        stage: &'static str,
        param: &'static str,
        reason: String,
    },

    #[error("[{stage}] numeric failure: {reason}")]
    NumericDegenerate { stage: &'static str, reason: String },

    #[error("[{stage}] buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("FFT failure: {0}")]
    Fft(#[from] FftError),
}

impl SimError {
    pub(crate) fn invalid(stage: &'static str, param: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidConfig { stage, param, reason: reason.into() }
    }

    pub(crate) fn degenerate(stage: &'static str, reason: impl Into<String>) -> Self {
        SimError::NumericDegenerate { stage, reason: reason.into() }
    }

    pub(crate) fn length(stage: &'static str, expected: usize, actual: usize) -> Self {
        SimError::LengthMismatch { stage, expected, actual }
    }
}
