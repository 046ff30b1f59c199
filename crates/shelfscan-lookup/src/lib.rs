//! Barcode-to-product resolution.
//!
//! A scan is expanded into candidate identifiers
//! ([`shelfscan_core::candidate_identifiers`]). Every candidate is looked up
//! in the local [`ProductStore`] first; only when none is stored are they
//! tried against the remote [`CatalogSource`], until one hits or a terminal
//! error stops the run. Catalog hits are written
//! back to the store. [`LookupSession`] wraps a [`Resolver`] with the state a
//! presentation layer renders and the cancel handle it needs.

pub mod catalog;
pub mod debounce;
mod local;
pub mod message;
mod persist;
pub mod resolver;
pub mod session;
pub mod store;

pub use catalog::CatalogSource;
pub use debounce::ScanDebouncer;
pub use message::UserMessage;
pub use resolver::{NotFoundReason, Provenance, Resolution, Resolver};
pub use session::{LookupSession, LookupSnapshot, LookupStatus, SessionError};
pub use store::{PgProductStore, ProductStore, StoreError};
