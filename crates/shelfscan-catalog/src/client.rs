//! HTTP client for the product catalog's `gtins` endpoint.

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use tokio_util::sync::CancellationToken;

use crate::error::CatalogError;
use crate::normalize::normalize_product;
use crate::types::{CatalogProduct, CosmosProduct};

const DEFAULT_BASE_URL: &str = "https://api.cosmos.bluesoft.com.br/";
const DEFAULT_TOKEN_HEADER: &str = "X-Cosmos-Token";
const DEFAULT_USER_AGENT: &str = "Cosmos-API-Request";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Settings for [`CatalogClient`].
#[derive(Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    /// `None` switches the client into placeholder mode: no requests are
    /// made and every lookup returns [`CatalogProduct::placeholder`].
    pub token: Option<String>,
    pub token_header: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            token: None,
            token_header: DEFAULT_TOKEN_HEADER.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub fn from_app_config(config: &shelfscan_core::AppConfig) -> Self {
        Self {
            base_url: config.catalog_base_url.clone(),
            token: config.catalog_token.clone(),
            token_header: config.catalog_token_header.clone(),
            user_agent: config.catalog_user_agent.clone(),
            timeout_secs: config.catalog_timeout_secs,
        }
    }
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("token_header", &self.token_header)
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Client for the product catalog.
///
/// Classifies responses as: 200 → product, 404 → `Ok(None)`, 401/403 →
/// [`CatalogError::Unauthorized`], 429 → [`CatalogError::RateLimited`], any
/// other non-2xx → [`CatalogError::UnexpectedStatus`]. Nothing is retried;
/// the caller decides what a failure means for the resolution as a whole.
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    credential: Option<(HeaderName, HeaderValue)>,
}

impl CatalogClient {
    /// Creates a client from explicit settings.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    /// - [`CatalogError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`CatalogError::InvalidTokenHeader`] if the header name or token are
    ///   not valid HTTP header text.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash so `Url::join` appends to the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
            base_url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let credential = match &config.token {
            Some(token) => {
                let name = HeaderName::from_bytes(config.token_header.as_bytes()).map_err(|e| {
                    CatalogError::InvalidTokenHeader {
                        reason: format!("header name \"{}\": {e}", config.token_header),
                    }
                })?;
                let mut value =
                    HeaderValue::from_str(token).map_err(|e| CatalogError::InvalidTokenHeader {
                        reason: format!("token value: {e}"),
                    })?;
                value.set_sensitive(true);
                Some((name, value))
            }
            None => None,
        };

        Ok(Self {
            client,
            base_url,
            credential,
        })
    }

    /// Creates a client pointed at `base_url` with a token, for tests against
    /// a mock server.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::new`].
    pub fn with_base_url(base_url: &str, token: Option<&str>) -> Result<Self, CatalogError> {
        Self::new(&CatalogConfig {
            base_url: base_url.to_owned(),
            token: token.map(str::to_owned),
            timeout_secs: 5,
            ..CatalogConfig::default()
        })
    }

    /// `true` when no credential is configured and lookups are faked.
    #[must_use]
    pub fn is_placeholder_mode(&self) -> bool {
        self.credential.is_none()
    }

    /// Looks up one identifier.
    ///
    /// Returns `Ok(None)` when the catalog does not know the identifier. In
    /// placeholder mode returns a [`CatalogProduct`] with `placeholder = true`
    /// without touching the network.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Cancelled`] if `cancel` fires before the response
    ///   is complete, or was already cancelled.
    /// - [`CatalogError::Unauthorized`] on HTTP 401/403.
    /// - [`CatalogError::RateLimited`] on HTTP 429.
    /// - [`CatalogError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`CatalogError::Http`] on network or TLS failure.
    /// - [`CatalogError::Deserialize`] if a 2xx body is not a product object.
    /// - [`CatalogError::InvalidIdentifier`] if `identifier` is not all digits.
    pub async fn lookup(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogProduct>, CatalogError> {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        let Some((header_name, header_value)) = &self.credential else {
            tracing::debug!(identifier, "no catalog token configured; returning placeholder");
            return Ok(Some(CatalogProduct::placeholder(identifier)));
        };

        let url = self.product_url(identifier)?;

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(identifier, "catalog lookup cancelled in flight");
                Err(CatalogError::Cancelled)
            }
            result = self.fetch(url, identifier, header_name, header_value) => result,
        }
    }

    /// Builds `{base}/gtins/{identifier}.json`.
    fn product_url(&self, identifier: &str) -> Result<Url, CatalogError> {
        if identifier.is_empty() || !identifier.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CatalogError::InvalidIdentifier {
                identifier: identifier.to_owned(),
            });
        }
        self.base_url
            .join(&format!("gtins/{identifier}.json"))
            .map_err(|e| CatalogError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn fetch(
        &self,
        url: Url,
        identifier: &str,
        header_name: &HeaderName,
        header_value: &HeaderValue,
    ) -> Result<Option<CatalogProduct>, CatalogError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .header(header_name.clone(), header_value.clone())
            .send()
            .await?;
        let status = response.status();
        tracing::debug!(identifier, status = status.as_u16(), "catalog responded");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CatalogError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(CatalogError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let raw: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
                context: format!("gtins/{identifier}"),
                source: e,
            })?;
        let product: CosmosProduct =
            serde_json::from_value(raw.clone()).map_err(|e| CatalogError::Deserialize {
                context: format!("gtins/{identifier}"),
                source: e,
            })?;

        Ok(Some(normalize_product(identifier, product, raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> CatalogClient {
        CatalogClient::with_base_url(base_url, Some("test-token"))
            .expect("client construction should not fail")
    }

    #[test]
    fn product_url_appends_gtin_path() {
        let client = test_client("https://api.cosmos.bluesoft.com.br");
        let url = client.product_url("7891000315507").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cosmos.bluesoft.com.br/gtins/7891000315507.json"
        );
    }

    #[test]
    fn product_url_keeps_base_path() {
        let client = test_client("https://proxy.example/catalog/v1/");
        let url = client.product_url("012345678905").unwrap();
        assert_eq!(
            url.as_str(),
            "https://proxy.example/catalog/v1/gtins/012345678905.json"
        );
    }

    #[test]
    fn product_url_rejects_non_digit_identifiers() {
        let client = test_client("https://api.cosmos.bluesoft.com.br");
        for bad in ["", "12a4", "../admin"] {
            assert!(
                matches!(
                    client.product_url(bad),
                    Err(CatalogError::InvalidIdentifier { .. })
                ),
                "expected InvalidIdentifier for {bad:?}"
            );
        }
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = CatalogClient::with_base_url("not a url", Some("t"));
        assert!(matches!(result, Err(CatalogError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn invalid_token_header_is_rejected() {
        let result = CatalogClient::new(&CatalogConfig {
            token: Some("t".to_owned()),
            token_header: "bad header".to_owned(),
            ..CatalogConfig::default()
        });
        assert!(matches!(
            result,
            Err(CatalogError::InvalidTokenHeader { .. })
        ));
    }

    #[test]
    fn missing_token_means_placeholder_mode() {
        let client = CatalogClient::with_base_url("https://api.example", None).unwrap();
        assert!(client.is_placeholder_mode());
        assert!(!test_client("https://api.example").is_placeholder_mode());
    }

    #[test]
    fn config_debug_redacts_token() {
        let config = CatalogConfig {
            token: Some("super-secret".to_owned()),
            ..CatalogConfig::default()
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
