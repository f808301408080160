// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpotifyError>;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Token request rejected: {status} - {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Rate limit exceeded (retry after {retry_after:?}s)")]
    RateLimitExceeded { retry_after: Option<u64> },

    #[error("Rate limiter closed")]
    RateLimiterClosed,

    #[error("Invalid response from Spotify API: {0}")]
    InvalidResponse(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
