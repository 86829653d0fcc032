use thiserror::Error;

/// Errors raised by the rate normalization pipeline and its data sources.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateError {
    /// A series identifier outside the three known ECB rates.
    #[error("unknown rate series '{0}' (expected refi, deposit or lending)")]
    UnknownSeriesKind(String),

    /// No change points to expand from.
    #[error("no change points available to expand")]
    InsufficientData,

    /// The requested calendar range is empty.
    #[error("invalid year range {start}..={end}")]
    InvalidRange { start: i32, end: i32 },

    /// A year that must be complete holds fewer than 12 distinct months.
    #[error("year {year} has {months} of 12 monthly observations")]
    IncompleteYear { year: i32, months: usize },

    /// Network, HTTP status or transport failure while refreshing a series.
    #[error("remote fetch failed: {0}")]
    RemoteFetchFailed(String),

    /// The remote payload did not have the expected shape.
    #[error("malformed ECB envelope: {0}")]
    MalformedEnvelope(String),
}

impl RateError {
    /// Whether the error is an expected remote condition that the service
    /// resolves by falling back to static data.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RateError::RemoteFetchFailed(_) | RateError::MalformedEnvelope(_) | RateError::IncompleteYear { .. }
        )
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        let exit_code = match err {
            RateError::UnknownSeriesKind(_) | RateError::InvalidRange { .. } => 2,
            _ => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
