#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub catalog_base_url: String,
    /// `None` puts the catalog client in placeholder mode.
    pub catalog_token: Option<String>,
    pub catalog_token_header: String,
    pub catalog_user_agent: String,
    pub catalog_timeout_secs: u64,
    pub scan_cooldown_ms: u64,
    pub auth_url: Option<String>,
    pub auth_anon_key: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("catalog_base_url", &self.catalog_base_url)
            .field(
                "catalog_token",
                &self.catalog_token.as_ref().map(|_| "[redacted]"),
            )
            .field("catalog_token_header", &self.catalog_token_header)
            .field("catalog_user_agent", &self.catalog_user_agent)
            .field("catalog_timeout_secs", &self.catalog_timeout_secs)
            .field("scan_cooldown_ms", &self.scan_cooldown_ms)
            .field("auth_url", &self.auth_url)
            .field(
                "auth_anon_key",
                &self.auth_anon_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
