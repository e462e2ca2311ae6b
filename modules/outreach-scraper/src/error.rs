/// Result type alias for scrape operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Message shown to API callers when a fetch blows up mid-pipeline.
pub const EXECUTION_FAILED: &str = "Scrape execution failed";

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Could not find a website for \"{0}\"")]
    Unresolved(String),

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("URL not allowed: {reason}")]
    BlockedUrl { reason: String },

    #[error("Failed to fetch: HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("Feed parse failed: {0}")]
    Feed(String),

    #[error("Batch deadline exceeded")]
    DeadlineExceeded,
}

impl ScrapeError {
    /// Text placed in a failed result's `error` field.
    /// Transport failures are collapsed so internal hostnames and errors don't leak.
    pub fn public_message(&self) -> String {
        match self {
            ScrapeError::Network { .. } | ScrapeError::Timeout { .. } => {
                EXECUTION_FAILED.to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ScrapeError::Network { .. } | ScrapeError::Timeout { .. })
    }
}
