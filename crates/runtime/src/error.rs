//! Error types for generated API calls.

use thiserror::Error;

/// Error returned by a generated call's `execute`.
#[derive(Debug, Error)]
pub enum Error {
    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body did not match the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The base URL or a method path did not form a valid URL.
    #[error("invalid request URL {url:?}: {source}")]
    Url {
        /// The text that failed to parse.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// The HTTP verb is not a valid method token.
    #[error("invalid HTTP method {0:?}")]
    Method(String),

    /// Transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error {status}: {}", .message.as_deref().unwrap_or(.body.as_str()))]
    Api {
        /// HTTP status code.
        status: u16,
        /// `error.message` from a JSON error body.
        message: Option<String>,
        /// Raw response body.
        body: String,
    },
}

/// Result type alias for API calls.
pub type Result<T, E = Error> = std::result::Result<T, E>;
