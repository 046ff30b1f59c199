use thiserror::Error;

/// Errors returned by [`crate::CatalogClient`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP 401 or 403: the catalog token is missing, wrong, or revoked.
    #[error("catalog rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    /// HTTP 429. `retry_after_secs` is set when the server sent a numeric
    /// `Retry-After` header.
    #[error("rate limited by catalog")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The caller's cancellation token fired before the response arrived.
    #[error("catalog lookup cancelled")]
    Cancelled,

    #[error("invalid catalog base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("invalid catalog token header: {reason}")]
    InvalidTokenHeader { reason: String },

    /// Identifiers are digit strings; anything else is refused before a
    /// request is built.
    #[error("invalid product identifier \"{identifier}\"")]
    InvalidIdentifier { identifier: String },
}

impl CatalogError {
    /// HTTP status code associated with the error, if there was a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Unauthorized { status } | CatalogError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            CatalogError::RateLimited { .. } => Some(429),
            CatalogError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
