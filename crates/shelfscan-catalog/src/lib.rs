//! Client for the third-party product catalog (Cosmos `gtins` API).
//!
//! A lookup either finds a product, reports that the identifier is unknown
//! (`Ok(None)`), or fails with a [`CatalogError`]. Every error is terminal
//! for a barcode resolution; only "unknown identifier" lets the caller move
//! on to the next candidate.

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{CatalogClient, CatalogConfig};
pub use error::CatalogError;
pub use normalize::normalize_product;
pub use types::{CatalogProduct, CosmosProduct};
