use thiserror::Error;

use stockcast_core::DomainError;

/// Result type used across the forecasting engine.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Failures surfaced by the forecasting engine.
///
/// Nothing here is retried internally; retry policy belongs to whoever schedules
/// the work (see `JobScheduler` and the infra runner).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    /// Fewer historical points than the operation requires.
    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The injected sales-history or metadata reader failed.
    #[error("data source failed: {0}")]
    Source(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ForecastError {
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Whether a scheduler may reasonably try the same work again later.
    ///
    /// Data-sufficiency and validation failures are deterministic for a given
    /// history snapshot; only source failures can change between attempts.
    pub fn is_transient(&self) -> bool {
        matches!(self, ForecastError::Source(_))
    }
}

impl From<DomainError> for ForecastError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::InvalidInput(msg),
        }
    }
}
