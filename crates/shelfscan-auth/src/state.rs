//! Application-wide view of who is signed in.
//!
//! [`AuthState`] owns a provider, loads its session once at start-up and then
//! follows the provider's events, so every consumer sees the same session
//! through a `watch` channel. Call [`AuthState::shutdown`] to stop following.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::AuthError;
use crate::provider::AuthProvider;
use crate::types::{AuthEvent, AuthSession, AuthUser, OtpPurpose};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub session: Option<AuthSession>,
    /// `true` until the initial session load has finished.
    pub loading: bool,
}

pub struct AuthState {
    provider: Arc<dyn AuthProvider>,
    state: Arc<watch::Sender<AuthSnapshot>>,
    shutdown: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AuthState {
    /// Subscribes to `provider`, then loads its current session.
    ///
    /// A session whose refresh token was rejected is signed out and cleared;
    /// any other load failure leaves the user signed out.
    pub async fn start(provider: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(AuthSnapshot {
            session: None,
            loading: true,
        });
        let state = Arc::new(state);
        let shutdown = CancellationToken::new();

        let listener = tokio::spawn(follow_events(
            provider.subscribe(),
            Arc::clone(&state),
            shutdown.clone(),
        ));

        let initial = match provider.current_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load auth session");
                if e.is_invalid_refresh_token() {
                    if let Err(e) = provider.sign_out().await {
                        tracing::warn!(error = %e, "sign-out after rejected refresh token failed");
                    }
                }
                None
            }
        };
        state.send_modify(|s| {
            s.session = initial;
            s.loading = false;
        });

        Self {
            provider,
            state,
            shutdown,
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Stops following provider events and waits for the listener to exit.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            if let Err(e) = listener.await {
                tracing::warn!(error = %e, "auth listener task failed");
            }
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.state.borrow().session.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<AuthUser> {
        self.state.borrow().session.as_ref().map(|s| s.user.clone())
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// `true` when a user is signed in and has confirmed their email.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.state
            .borrow()
            .session
            .as_ref()
            .is_some_and(|s| s.user.is_verified())
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    /// # Errors
    ///
    /// Propagates the provider's [`AuthError`].
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSession>, AuthError> {
        let session = self.provider.sign_up(email, password).await?;
        if let Some(session) = &session {
            self.set_session(Some(session.clone()));
        }
        Ok(session)
    }

    /// # Errors
    ///
    /// Propagates the provider's [`AuthError`].
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// # Errors
    ///
    /// Propagates the provider's [`AuthError`].
    pub async fn send_otp(&self, email: &str) -> Result<(), AuthError> {
        self.provider.send_otp(email).await
    }

    /// # Errors
    ///
    /// Propagates the provider's [`AuthError`].
    pub async fn verify_otp(
        &self,
        email: &str,
        token: &str,
        purpose: OtpPurpose,
    ) -> Result<AuthSession, AuthError> {
        let session = self.provider.verify_otp(email, token, purpose).await?;
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// # Errors
    ///
    /// Propagates the provider's [`AuthError`].
    pub async fn send_password_reset_otp(&self, email: &str) -> Result<(), AuthError> {
        self.provider.request_password_reset(email).await
    }

    /// Recovery flavour of [`AuthState::verify_otp`].
    ///
    /// # Errors
    ///
    /// Propagates the provider's [`AuthError`].
    pub async fn verify_password_reset_otp(
        &self,
        email: &str,
        token: &str,
    ) -> Result<AuthSession, AuthError> {
        self.verify_otp(email, token, OtpPurpose::Recovery).await
    }

    /// # Errors
    ///
    /// Propagates the provider's [`AuthError`]; [`AuthError::NoSession`] when
    /// nobody is signed in.
    pub async fn update_password(&self, password: &str) -> Result<AuthUser, AuthError> {
        let user = self.provider.update_password(password).await?;
        self.state.send_modify(|s| {
            if let Some(session) = s.session.as_mut() {
                session.user = user.clone();
            }
        });
        Ok(user)
    }

    /// Signs out. The local session is cleared whatever the provider returns.
    ///
    /// # Errors
    ///
    /// Propagates the provider's [`AuthError`].
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.provider.sign_out().await;
        self.set_session(None);
        result
    }

    fn set_session(&self, session: Option<AuthSession>) {
        self.state.send_if_modified(|s| {
            if s.session == session {
                return false;
            }
            s.session = session;
            true
        });
    }
}

impl Drop for AuthState {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn follow_events(
    mut events: broadcast::Receiver<AuthEvent>,
    state: Arc<watch::Sender<AuthSnapshot>>,
    shutdown: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            event = events.recv() => event,
        };
        match event {
            Ok(event) => {
                tracing::debug!(?event, "auth event");
                let session = event.session().cloned();
                state.send_if_modified(|s| {
                    if s.session == session {
                        return false;
                    }
                    s.session = session;
                    true
                });
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "auth listener lagged behind provider events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
