// api/errors.rs

use thiserror::Error;

/// Error types for remote API operations
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unexpected status {status} from {endpoint}")]
    StatusError { status: u16, endpoint: String },

    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Empty response from {0}")]
    EmptyResponse(String),
}

// Convert from common error types
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::ParseError(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::ParseError(err.to_string())
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}
