use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by outbound HTTP calls (price endpoint and prediction backend).
///
/// None of these are fatal: quote failures degrade to fallback data and
/// backend failures flip the status chip to offline.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("JSON parse failed: {0}")]
    Decode(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Determine if the error came from the remote side rather than the network.
    pub fn is_upstream(&self) -> bool {
        matches!(self, FetchError::Status(_) | FetchError::Decode(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            Self::Status(status.as_u16())
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidUrl(error.to_string())
    }
}

/// Errors raised while building a [`DashboardConfig`](super::config::DashboardConfig).
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid URL in {variable}: {reason}")]
    InvalidUrl { variable: String, reason: String },
}
