//! Error types for the vkmap-crawl crate.

use thiserror::Error;

/// API error code for a profile whose data is hidden by privacy settings.
pub const CODE_ACCESS_RESTRICTED: i64 = 30;
/// API error code for exceeding the per-second request quota.
pub const CODE_TOO_MANY_REQUESTS: i64 = 6;
/// API error code for a server-side failure.
pub const CODE_INTERNAL_SERVER_ERROR: i64 = 10;
/// API error code for an identity or handle that does not exist.
pub const CODE_INVALID_USER_ID: i64 = 113;

/// Failure of a single remote API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode API response: {0}")]
    Decode(String),
}

impl FetchError {
    /// The remote side refused to disclose the data for privacy reasons.
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Api { code, .. } if *code == CODE_ACCESS_RESTRICTED)
    }

    /// A condition that may clear up on a later call.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Api { code, .. } => {
                *code == CODE_TOO_MANY_REQUESTS || *code == CODE_INTERNAL_SERVER_ERROR
            }
            Self::Decode(_) => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Could not resolve handle {handle:?} to a user id")]
    Resolution { handle: String },

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
