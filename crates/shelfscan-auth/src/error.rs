use thiserror::Error;

/// Errors returned by the auth provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The auth server answered with a non-2xx status.
    #[error("auth API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NoSession,

    /// A required form field was empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid auth base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("invalid anon key: {0}")]
    InvalidApiKey(String),
}

impl AuthError {
    /// `true` when the stored refresh token was rejected and the session can
    /// never be renewed.
    #[must_use]
    pub fn is_invalid_refresh_token(&self) -> bool {
        matches!(self, AuthError::Api { message, .. } if message.contains("Refresh Token"))
    }
}
