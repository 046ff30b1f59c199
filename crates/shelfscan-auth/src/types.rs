use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// `true` once the user has confirmed their email address.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}

/// A signed-in session as issued by the token endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

impl AuthSession {
    /// Seconds before `expires_at` at which the session is renewed.
    const EXPIRY_MARGIN_SECS: i64 = 10;

    /// `true` when the access token is expired or about to be. Sessions
    /// without an expiry never expire.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| at - Self::EXPIRY_MARGIN_SECS <= now.timestamp())
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Which flow a one-time code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    #[default]
    Signup,
    Recovery,
}

impl OtpPurpose {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OtpPurpose::Signup => "signup",
            OtpPurpose::Recovery => "recovery",
        }
    }
}

/// Session changes broadcast by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthSession),
    SignedOut,
    UserUpdated(AuthSession),
    /// A recovery code was accepted; the session may only be used to set a
    /// new password.
    PasswordRecovery(AuthSession),
}

impl AuthEvent {
    #[must_use]
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            AuthEvent::SignedIn(s) | AuthEvent::UserUpdated(s) | AuthEvent::PasswordRecovery(s) => {
                Some(s)
            }
            AuthEvent::SignedOut => None,
        }
    }
}

/// Body of a sign-up response: a session when the server auto-confirms, the
/// bare user when a confirmation code was sent instead.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}
