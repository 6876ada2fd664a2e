//! GitHub client error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during search and fetch operations
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Rate limited until {reset:?}")]
    RateLimited { reset: Option<DateTime<Utc>> },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Clone of '{repository}' failed: {message}")]
    CloneFailed { repository: String, message: String },
}

impl GithubError {
    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, GithubError::RateLimited { .. })
    }

    /// Check if the candidate should be skipped rather than the run aborted
    pub fn is_skippable(&self) -> bool {
        match self {
            GithubError::CloneFailed { .. } => true,
            GithubError::Network(_) => true,
            GithubError::ApiError { status, .. } => *status >= 500,
            GithubError::RateLimited { .. } => false,
        }
    }
}
