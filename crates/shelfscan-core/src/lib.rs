//! Domain types and configuration shared by every `shelfscan` crate.

mod app_config;
pub mod barcode;
mod config;
pub mod inventory;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use barcode::{candidate_identifiers, strip_non_digits};
pub use config::{load_app_config, load_app_config_from_env};
pub use inventory::{parse_expiration_date, InventoryError, NewInventoryItem};
pub use products::{ProductRecord, ProductSource};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
