//! Error taxonomy for the Clipper pipeline

use thiserror::Error;

/// Failures surfaced to callers of the pipeline.
///
/// Extraction deficits are deliberately NOT represented here: a page that
/// yields no content block still produces a well-formed [`crate::ExtractResult`]
/// carrying the configured error message and the observed HTTP status.
/// Rule-file problems never surface either — an unreadable or empty file
/// reads as "no config for this host".
#[derive(Error, Debug)]
pub enum ClipperError {
    /// Malformed input URL, or a URL that failed validation
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Rejected by the allow/block lists or a MIME `exclude` action
    #[error("blocked by policy: {0}")]
    PolicyBlocked(String),

    /// Transport-level failure surfaced from the fetcher
    #[error("fetch failed for {url}: {message}")]
    FetchFailed {
        url: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl ClipperError {
    /// Create an invalid-URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a fetch failure with a source error
    pub fn fetch_failed<E>(url: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::FetchFailed {
            url: url.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a fetch failure without a source
    pub fn fetch_failed_msg(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }
}

/// Convenience alias for results using [`ClipperError`]
pub type ClipperResult<T> = Result<T, ClipperError>;
