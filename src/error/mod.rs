use thiserror::Error;

/// Errors raised by the decomposition and projection pipeline.
///
/// The three variants separate faults in the data, faults in the calling code and
/// genuine numerical failures, so a caller can decide whether to clean the input,
/// fix the request or try a different matrix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PcaError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("component index {index} is outside [0, {rank})")]
    IndexOutOfRange { index: i64, rank: usize },

    #[error("singular value decomposition failed: {0}")]
    DecompositionFailure(String),
}

pub type Result<T> = std::result::Result<T, PcaError>;

impl PcaError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PcaError::InvalidInput(msg.into())
    }

    pub(crate) fn decomposition(msg: impl Into<String>) -> Self {
        PcaError::DecompositionFailure(msg.into())
    }
}
