use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CohortServiceError {
    #[error("invalid cohort service url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("cohort service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Rejected(#[from] ApiError),
    #[error("cohort service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("cohort service unavailable")]
    Unavailable,
}

impl CohortServiceError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Rejected(err) => err.is_not_found(),
            Self::Status { status, .. } => *status == 404,
            _ => false,
        }
    }
}
