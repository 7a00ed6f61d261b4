use thiserror::Error;

/// Errors returned by the study service client.
#[derive(Debug, Error)]
pub enum StudyError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a status other than 2xx or 404.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid study service URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
