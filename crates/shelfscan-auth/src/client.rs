//! HTTP client for a GoTrue-compatible auth server.
//!
//! Every request carries the project's anon key in the `apikey` header;
//! user-scoped calls add the session's access token as a bearer token. The
//! session lives in memory and each change is broadcast as an [`AuthEvent`].

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::error::AuthError;
use crate::provider::AuthProvider;
use crate::types::{AuthEvent, AuthSession, AuthUser, OtpPurpose, SignUpResponse};

const EVENT_CAPACITY: usize = 16;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Fields of an error body that may hold the human-readable message, most
/// specific first.
const ERROR_MESSAGE_FIELDS: [&str; 4] = ["error_description", "msg", "message", "error"];

#[derive(Clone)]
pub struct GoTrueConfig {
    /// Root of the auth API, e.g. `https://<project>.supabase.co/auth/v1`.
    pub base_url: String,
    pub anon_key: String,
    pub timeout_secs: u64,
}

impl GoTrueConfig {
    /// Returns `None` unless both the auth URL and anon key are configured.
    #[must_use]
    pub fn from_app_config(config: &shelfscan_core::AppConfig) -> Option<Self> {
        Some(Self {
            base_url: config.auth_url.clone()?,
            anon_key: config.auth_anon_key.clone()?,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }
}

impl std::fmt::Debug for GoTrueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoTrueConfig")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[redacted]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

pub struct GoTrueClient {
    client: Client,
    base_url: Url,
    api_key: HeaderValue,
    session: Mutex<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl GoTrueClient {
    /// # Errors
    ///
    /// - [`AuthError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    /// - [`AuthError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`AuthError::InvalidApiKey`] if the anon key is not valid header text.
    pub fn new(config: &GoTrueConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("shelfscan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AuthError::InvalidBaseUrl {
            base_url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut api_key = HeaderValue::from_str(&config.anon_key)
            .map_err(|e| AuthError::InvalidApiKey(e.to_string()))?;
        api_key.set_sensitive(true);

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            client,
            base_url,
            api_key,
            session: Mutex::new(None),
            events,
        })
    }

    /// Creates a client pointed at `base_url` (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`GoTrueClient::new`].
    pub fn with_base_url(base_url: &str, anon_key: &str) -> Result<Self, AuthError> {
        Self::new(&GoTrueConfig {
            base_url: base_url.to_owned(),
            anon_key: anon_key.to_owned(),
            timeout_secs: 5,
        })
    }

    /// Restores a previously issued session.
    #[must_use]
    pub fn with_session(self, session: AuthSession) -> Self {
        *self.session_slot() = Some(session);
        self
    }

    fn session_slot(&self) -> MutexGuard<'_, Option<AuthSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn token_endpoint(&self, grant_type: &str) -> Result<Url, AuthError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        Ok(url)
    }

    /// Sends `request` and returns the body of a 2xx response.
    async fn send(&self, request: RequestBuilder, context: &str) -> Result<String, AuthError> {
        let response = request
            .header("apikey", self.api_key.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(context, status = status.as_u16(), "auth server responded");
        if status.is_success() {
            Ok(body)
        } else {
            Err(api_error(status, &body))
        }
    }

    fn store(&self, session: AuthSession, event: fn(AuthSession) -> AuthEvent) -> AuthSession {
        *self.session_slot() = Some(session.clone());
        // No receivers is fine; nobody is listening yet.
        let _ = self.events.send(event(session.clone()));
        session
    }

    async fn refresh(&self, stale: &AuthSession) -> Result<AuthSession, AuthError> {
        let url = self.token_endpoint("refresh_token")?;
        let body = self
            .send(
                self.client
                    .post(url)
                    .json(&json!({ "refresh_token": stale.refresh_token })),
                "token(refresh_token)",
            )
            .await?;
        let session: AuthSession = parse(&body, "token(refresh_token)")?;
        *self.session_slot() = Some(session.clone());
        tracing::debug!(user_id = %session.user.id, "session refreshed");
        Ok(session)
    }
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSession>, AuthError> {
        let email = required("email", email)?;
        required("password", password)?;

        let body = self
            .send(
                self.client
                    .post(self.endpoint("signup")?)
                    .json(&json!({ "email": email, "password": password })),
                "signup",
            )
            .await?;
        match parse::<SignUpResponse>(&body, "signup")? {
            SignUpResponse::Session(session) => {
                tracing::info!(user_id = %session.user.id, "signed up and signed in");
                Ok(Some(self.store(session, AuthEvent::SignedIn)))
            }
            SignUpResponse::User(user) => {
                tracing::info!(user_id = %user.id, "signed up; confirmation pending");
                Ok(None)
            }
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let email = required("email", email)?;
        required("password", password)?;

        let body = self
            .send(
                self.client
                    .post(self.token_endpoint("password")?)
                    .json(&json!({ "email": email, "password": password })),
                "token(password)",
            )
            .await?;
        let session: AuthSession = parse(&body, "token(password)")?;
        tracing::info!(user_id = %session.user.id, "signed in");
        Ok(self.store(session, AuthEvent::SignedIn))
    }

    async fn send_otp(&self, email: &str) -> Result<(), AuthError> {
        let email = required("email", email)?;
        self.send(
            self.client
                .post(self.endpoint("otp")?)
                .json(&json!({ "email": email, "create_user": true })),
            "otp",
        )
        .await?;
        Ok(())
    }

    async fn verify_otp(
        &self,
        email: &str,
        token: &str,
        purpose: OtpPurpose,
    ) -> Result<AuthSession, AuthError> {
        let email = required("email", email)?;
        let token = required("code", token)?;

        let body = self
            .send(
                self.client.post(self.endpoint("verify")?).json(&json!({
                    "type": purpose.as_str(),
                    "email": email,
                    "token": token,
                })),
                "verify",
            )
            .await?;
        let session: AuthSession = parse(&body, "verify")?;
        tracing::info!(user_id = %session.user.id, purpose = purpose.as_str(), "code verified");
        let event = match purpose {
            OtpPurpose::Signup => AuthEvent::SignedIn,
            OtpPurpose::Recovery => AuthEvent::PasswordRecovery,
        };
        Ok(self.store(session, event))
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = required("email", email)?;
        self.send(
            self.client
                .post(self.endpoint("recover")?)
                .json(&json!({ "email": email })),
            "recover",
        )
        .await?;
        Ok(())
    }

    async fn update_password(&self, password: &str) -> Result<AuthUser, AuthError> {
        required("password", password)?;
        let session = self.current_session().await?.ok_or(AuthError::NoSession)?;

        let body = self
            .send(
                self.client
                    .put(self.endpoint("user")?)
                    .bearer_auth(&session.access_token)
                    .json(&json!({ "password": password })),
                "user",
            )
            .await?;
        let user: AuthUser = parse(&body, "user")?;
        tracing::info!(user_id = %user.id, "password updated");
        self.store(
            AuthSession {
                user: user.clone(),
                ..session
            },
            AuthEvent::UserUpdated,
        );
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.session_slot().take();
        if let Some(session) = previous {
            let result = match self.endpoint("logout") {
                Ok(url) => {
                    self.send(
                        self.client.post(url).bearer_auth(&session.access_token),
                        "logout",
                    )
                    .await
                }
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "server sign-out failed; local session cleared anyway");
            }
        }
        let _ = self.events.send(AuthEvent::SignedOut);
        tracing::info!("signed out");
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let current = self.session_slot().clone();
        match current {
            Some(session) if session.is_expired(Utc::now()) => self.refresh(&session).await.map(Some),
            other => Ok(other),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

/// Trims `value` and rejects it when blank.
fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AuthError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn parse<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, AuthError> {
    serde_json::from_str(body).map_err(|e| AuthError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Builds [`AuthError::Api`] from an error response, preferring the server's
/// own message over the bare status text.
fn api_error(status: StatusCode, body: &str) -> AuthError {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ERROR_MESSAGE_FIELDS
            .iter()
            .find_map(|field| value.get(field).and_then(Value::as_str).map(str::to_owned))
    });
    let message = from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_owned())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_owned()
        });
    AuthError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
