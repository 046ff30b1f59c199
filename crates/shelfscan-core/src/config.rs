use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `.env` templates can leave keys empty.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("SHELFSCAN_ENV", "development"));
    let log_level = or_default("SHELFSCAN_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("SHELFSCAN_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("SHELFSCAN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SHELFSCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let catalog_base_url = or_default(
        "SHELFSCAN_CATALOG_BASE_URL",
        "https://api.cosmos.bluesoft.com.br",
    );
    let catalog_token = optional("SHELFSCAN_CATALOG_TOKEN");
    let catalog_token_header = or_default("SHELFSCAN_CATALOG_TOKEN_HEADER", "X-Cosmos-Token");
    let catalog_user_agent = or_default("SHELFSCAN_CATALOG_USER_AGENT", "Cosmos-API-Request");
    let catalog_timeout_secs = parse_u64("SHELFSCAN_CATALOG_TIMEOUT_SECS", "15")?;

    let scan_cooldown_ms = parse_u64("SHELFSCAN_SCAN_COOLDOWN_MS", "1000")?;

    let auth_url = optional("SHELFSCAN_AUTH_URL");
    let auth_anon_key = optional("SHELFSCAN_AUTH_ANON_KEY");

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        catalog_base_url,
        catalog_token,
        catalog_token_header,
        catalog_user_agent,
        catalog_timeout_secs,
        scan_cooldown_ms,
        auth_url,
        auth_anon_key,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
