/// Rejected input to a collection constructor or update.
///
/// Every variant describes a caller mistake; nothing here is transient.
/// Validation happens before any table is built or any weight is stored,
/// so an `Err` never leaves a half-updated collection behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbError {
    #[error("Items cannot be empty.")]
    Empty,

    #[error("Items and probabilities must be the same size")]
    LengthMismatch { items: usize, probabilities: usize },

    #[error("Probabilities sum to greater than 1")]
    SumExceedsOne { sum: f64 },

    #[error("weights contain a negative value at index {index}: {value}")]
    Negative { index: usize, value: f64 },

    #[error("weights contain a non-finite value at index {index}: {value}")]
    NonFinite { index: usize, value: f64 },

    #[error("sum of weights is zero")]
    ZeroSum,

    #[error("sum of weights is not finite: {sum}")]
    SumNotFinite { sum: f64 },
}
