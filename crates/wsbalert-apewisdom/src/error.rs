use thiserror::Error;

/// Errors returned while fetching mention counts.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body was not valid JSON.
    #[error("JSON parse error for {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON without a `results` array.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// The configured endpoint is not a valid absolute URL.
    #[error("invalid mentions URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
