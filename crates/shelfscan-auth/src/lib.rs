//! Email/password and one-time-code authentication against a GoTrue
//! compatible server, plus the shared [`AuthState`] that tracks the signed-in
//! user.

pub mod client;
pub mod error;
pub mod provider;
pub mod state;
pub mod types;

pub use client::{GoTrueClient, GoTrueConfig};
pub use error::AuthError;
pub use provider::AuthProvider;
pub use state::{AuthSnapshot, AuthState};
pub use types::{AuthEvent, AuthSession, AuthUser, OtpPurpose};
