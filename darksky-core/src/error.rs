use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by forecast calls.
#[derive(Debug, Error)]
pub enum Error {
    /// The API key was missing, empty, or whitespace only.
    #[error("API key must not be empty or whitespace")]
    InvalidApiKey,

    #[error("Invalid coordinates: lat={latitude}, lon={longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// The service answered with a non-success status.
    #[error("Forecast request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The body was not valid JSON or did not look like a forecast.
    #[error("Failed to parse forecast JSON: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Failure reported by the [`HttpClient`](crate::HttpClient), passed through untouched.
    #[error(transparent)]
    Transport(anyhow::Error),
}

impl Error {
    /// `true` for errors raised before any request was attempted.
    pub fn is_argument(&self) -> bool {
        matches!(self, Error::InvalidApiKey | Error::InvalidCoordinates { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
