//! Lookup state exposed to the presentation layer.
//!
//! A [`LookupSession`] runs at most one resolution at a time. Starting a new
//! scan cancels the running one and waits for it to settle first, so two
//! lookups from the same session never write to the store concurrently.
//! State changes are published on a `watch` channel.

use std::sync::{Arc, Mutex, PoisonError};

use shelfscan_core::ProductRecord;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::message::UserMessage;
use crate::resolver::{Provenance, Resolution, Resolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    Idle,
    Searching,
    Found,
    NotFound,
    AuthFailure,
    RateLimited,
    TransportError,
    Cancelled,
}

impl LookupStatus {
    /// `true` for every state a resolution can end in.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, LookupStatus::Idle | LookupStatus::Searching)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LookupStatus::Idle => "idle",
            LookupStatus::Searching => "searching",
            LookupStatus::Found => "found",
            LookupStatus::NotFound => "not found",
            LookupStatus::AuthFailure => "auth failure",
            LookupStatus::RateLimited => "rate limited",
            LookupStatus::TransportError => "transport error",
            LookupStatus::Cancelled => "cancelled",
        }
    }
}

impl From<&Resolution> for LookupStatus {
    fn from(resolution: &Resolution) -> Self {
        match resolution {
            Resolution::Found { .. } => LookupStatus::Found,
            Resolution::NotFound { .. } => LookupStatus::NotFound,
            Resolution::AuthFailure { .. } => LookupStatus::AuthFailure,
            Resolution::RateLimited { .. } => LookupStatus::RateLimited,
            Resolution::TransportError { .. } => LookupStatus::TransportError,
            Resolution::Cancelled => LookupStatus::Cancelled,
        }
    }
}

/// Everything a UI needs to render the current lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupSnapshot {
    pub status: LookupStatus,
    /// The raw scanned text of the current lookup.
    pub scanned: Option<String>,
    /// The candidate identifier being (or last) tried.
    pub active_identifier: Option<String>,
    pub result: Option<ProductRecord>,
    pub provenance: Option<Provenance>,
    pub message: Option<UserMessage>,
}

impl LookupSnapshot {
    fn idle() -> Self {
        Self {
            status: LookupStatus::Idle,
            scanned: None,
            active_identifier: None,
            result: None,
            provenance: None,
            message: None,
        }
    }

    fn searching(scanned: &str) -> Self {
        Self {
            status: LookupStatus::Searching,
            scanned: Some(scanned.to_owned()),
            ..Self::idle()
        }
    }

    fn finish(&mut self, resolution: &Resolution) {
        self.status = LookupStatus::from(resolution);
        self.message = resolution.user_message();
        if let Resolution::Found {
            product,
            provenance,
        } = resolution
        {
            self.result = Some(product.clone());
            self.provenance = Some(*provenance);
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The result cannot be dismissed while a lookup is running; cancel it
    /// first.
    #[error("a lookup is still in progress")]
    StillSearching,
}

/// Owns the in-flight resolution and its observable state.
pub struct LookupSession {
    resolver: Arc<Resolver>,
    state: Arc<watch::Sender<LookupSnapshot>>,
    cancel: Mutex<Option<CancellationToken>>,
    inflight: tokio::sync::Mutex<Option<JoinHandle<Resolution>>>,
}

impl LookupSession {
    #[must_use]
    pub fn new(resolver: Resolver) -> Self {
        let (state, _) = watch::channel(LookupSnapshot::idle());
        Self {
            resolver: Arc::new(resolver),
            state: Arc::new(state),
            cancel: Mutex::new(None),
            inflight: tokio::sync::Mutex::new(None),
        }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> LookupSnapshot {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LookupSnapshot> {
        self.state.subscribe()
    }

    /// Starts resolving `scanned` in the background.
    ///
    /// A lookup already in flight is cancelled and awaited before the new one
    /// begins.
    pub async fn start(&self, scanned: &str) {
        let mut inflight = self.inflight.lock().await;
        if let Some(previous) = inflight.take() {
            let token = self.cancel_token_slot().take();
            if let Some(token) = token {
                token.cancel();
            }
            if let Err(e) = previous.await {
                tracing::warn!(error = %e, "previous lookup task failed");
            }
        }

        let cancel = CancellationToken::new();
        *self.cancel_token_slot() = Some(cancel.clone());
        self.state.send_replace(LookupSnapshot::searching(scanned));

        let resolver = Arc::clone(&self.resolver);
        let state = Arc::clone(&self.state);
        let scanned = scanned.to_owned();
        // The resolution runs in its own task so a panic inside it still
        // ends in a terminal snapshot instead of leaving `Searching` behind.
        *inflight = Some(tokio::spawn(async move {
            let observed = Arc::clone(&state);
            let resolving = tokio::spawn(async move {
                resolver
                    .resolve_observed(&scanned, &cancel, |identifier| {
                        observed
                            .send_modify(|s| s.active_identifier = Some(identifier.to_owned()));
                    })
                    .await
            });
            let resolution = match resolving.await {
                Ok(resolution) => resolution,
                Err(e) => {
                    tracing::error!(error = %e, "lookup task failed");
                    Resolution::TransportError {
                        status: None,
                        detail: format!("lookup task failed: {e}"),
                    }
                }
            };
            state.send_modify(|s| s.finish(&resolution));
            resolution
        }));
    }

    /// Waits for the in-flight lookup, if any, and returns its outcome.
    ///
    /// Cancel-safe: if this future is dropped early the lookup stays
    /// attached to the session and a later `wait` still collects it.
    pub async fn wait(&self) -> Option<Resolution> {
        let mut inflight = self.inflight.lock().await;
        let handle = inflight.as_mut()?;
        let joined = handle.await;
        inflight.take();
        match joined {
            Ok(resolution) => Some(resolution),
            Err(e) => {
                tracing::warn!(error = %e, "lookup task failed");
                None
            }
        }
    }

    /// Starts a lookup and waits for it to finish.
    pub async fn lookup(&self, scanned: &str) -> Option<Resolution> {
        self.start(scanned).await;
        self.wait().await
    }

    /// Signals the in-flight catalog call to stop.
    ///
    /// Returns `false`, doing nothing, when no lookup is searching.
    pub fn cancel(&self) -> bool {
        if self.state.borrow().status != LookupStatus::Searching {
            return false;
        }
        match self.cancel_token_slot().as_ref() {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Clears a finished result back to idle.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::StillSearching`] while a lookup is running.
    pub fn dismiss(&self) -> Result<(), SessionError> {
        let mut refused = false;
        self.state.send_if_modified(|s| {
            if s.status == LookupStatus::Searching {
                refused = true;
                return false;
            }
            if s.status == LookupStatus::Idle {
                return false;
            }
            *s = LookupSnapshot::idle();
            true
        });
        if refused {
            Err(SessionError::StillSearching)
        } else {
            Ok(())
        }
    }

    fn cancel_token_slot(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LookupSession {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token_slot().take() {
            token.cancel();
        }
    }
}
