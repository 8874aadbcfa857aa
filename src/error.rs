//! Error types for the coupon tracker.

/// All errors that can occur while driving the coupon workflow.
#[derive(Debug, thiserror::Error)]
pub enum CouponError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    ///
    /// `body` holds the decoded JSON error payload when the server sent one.
    #[error("API error (status {status})")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Decoded JSON body, if any.
        body: Option<serde_json::Value>,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A field the workflow depends on was absent or empty.
    #[error("response is missing field `{0}`")]
    MissingField(&'static str),

    /// The base URL or an endpoint path could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The supplied configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The log output could not be set up.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl CouponError {
    /// Returns the HTTP status code for [`CouponError::Api`] errors.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match *self {
            Self::Api { status, .. } => Some(status),
            Self::Http(_)
            | Self::Serialization(_)
            | Self::MissingField(_)
            | Self::InvalidUrl(_)
            | Self::Config(_)
            | Self::Logging(_) => None,
        }
    }
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = core::result::Result<T, CouponError>;
