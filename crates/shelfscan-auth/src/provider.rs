use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::AuthError;
use crate::types::{AuthEvent, AuthSession, AuthUser, OtpPurpose};

/// Email/password and one-time-code authentication.
///
/// Implementations keep the current session and broadcast an [`AuthEvent`]
/// every time it changes.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Registers a new account. Returns the session when the server signs the
    /// user in immediately, `None` when a confirmation code was emailed.
    async fn sign_up(&self, email: &str, password: &str)
        -> Result<Option<AuthSession>, AuthError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;

    /// Emails a one-time sign-in code.
    async fn send_otp(&self, email: &str) -> Result<(), AuthError>;

    async fn verify_otp(
        &self,
        email: &str,
        token: &str,
        purpose: OtpPurpose,
    ) -> Result<AuthSession, AuthError>;

    /// Emails a password recovery code.
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Sets a new password for the signed-in user.
    async fn update_password(&self, password: &str) -> Result<AuthUser, AuthError>;

    /// Ends the session. The local session is cleared even when the server
    /// call fails.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The current session, renewed first if it has expired.
    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError>;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
