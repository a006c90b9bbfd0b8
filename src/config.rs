use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Signing secret used when `JWT_SECRET` is unset. Fine for local
/// development only.
pub const DEV_JWT_SECRET: &str = "financegram-dev-secret";

/// Longest accepted token lifetime.
pub const MAX_TOKEN_TTL_DAYS: i64 = 365;

/// Longest accepted gap between ingestion cycles (one week).
pub const MAX_INGESTION_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub ingestion: IngestionConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; `None` keeps everything in memory
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Seconds between scheduled cycles
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// error, warn, info, debug or trace
    pub level: String,
    pub log_requests: bool,
    /// Mask client addresses in request logs
    pub sanitize_logs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes
    pub max_request_size: usize,
    pub enable_cors: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                token_ttl_days: 7,
            },
            ingestion: IngestionConfig { interval_secs: 300 },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_requests: true,
                sanitize_logs: true,
            },
            security: SecurityConfig {
                max_request_size: 64 * 1024,
                enable_cors: true,
            },
        }
    }
}

impl AppConfig {
    /// Load from the process environment and validate.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary variable source and validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("FINANCEGRAM_HOST") {
            config.server.host = host;
        }

        if let Some(port) = lookup("PORT") {
            config.server.port = port.trim().parse().context("Invalid PORT value")?;
        }

        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            config.database.url = Some(url);
        }

        if let Some(max) = lookup("FINANCEGRAM_DB_MAX_CONNECTIONS") {
            config.database.max_connections = max
                .trim()
                .parse()
                .context("Invalid FINANCEGRAM_DB_MAX_CONNECTIONS value")?;
        }

        if let Some(secret) = lookup("JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }

        if let Some(days) = lookup("FINANCEGRAM_TOKEN_TTL_DAYS") {
            config.auth.token_ttl_days = days
                .trim()
                .parse()
                .context("Invalid FINANCEGRAM_TOKEN_TTL_DAYS value")?;
        }

        if let Some(secs) = lookup("FINANCEGRAM_INGESTION_INTERVAL_SECS") {
            config.ingestion.interval_secs = secs
                .trim()
                .parse()
                .context("Invalid FINANCEGRAM_INGESTION_INTERVAL_SECS value")?;
        }

        if let Some(level) = lookup("FINANCEGRAM_LOG_LEVEL") {
            config.logging.level = level.trim().to_lowercase();
        }

        if let Some(log_requests) = lookup("FINANCEGRAM_LOG_REQUESTS") {
            config.logging.log_requests = log_requests
                .trim()
                .parse()
                .context("Invalid FINANCEGRAM_LOG_REQUESTS value")?;
        }

        if let Some(size) = lookup("FINANCEGRAM_MAX_REQUEST_SIZE") {
            config.security.max_request_size = size
                .trim()
                .parse()
                .context("Invalid FINANCEGRAM_MAX_REQUEST_SIZE value")?;
        }

        if let Some(cors) = lookup("FINANCEGRAM_ENABLE_CORS") {
            config.security.enable_cors = cors
                .trim()
                .parse()
                .context("Invalid FINANCEGRAM_ENABLE_CORS value")?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(anyhow!("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow!("Server port must be non-zero"));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow!("Database pool size must be non-zero"));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(anyhow!("JWT secret cannot be empty"));
        }

        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&self.auth.token_ttl_days) {
            return Err(anyhow!(
                "Token lifetime must be between 1 and {} days, got {}",
                MAX_TOKEN_TTL_DAYS,
                self.auth.token_ttl_days
            ));
        }

        if !(1..=MAX_INGESTION_INTERVAL_SECS).contains(&self.ingestion.interval_secs) {
            return Err(anyhow!(
                "Ingestion interval must be between 1 and {} seconds, got {}",
                MAX_INGESTION_INTERVAL_SECS,
                self.ingestion.interval_secs
            ));
        }

        if self.security.max_request_size == 0 {
            return Err(anyhow!("Maximum request size must be non-zero"));
        }

        if !matches!(
            self.logging.level.as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            return Err(anyhow!("Unknown log level: {}", self.logging.level));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn ingestion_period(&self) -> Duration {
        Duration::from_secs(self.ingestion.interval_secs)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.auth.token_ttl_days)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.auth.jwt_secret == DEV_JWT_SECRET
    }
}

/// Mask a secret for logging, keeping two characters at each end.
pub fn sanitize_for_logging(data: &str) -> String {
    let chars: Vec<char> = data.chars().collect();
    if chars.len() <= 4 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Database URL with the password replaced by `***`.
pub fn sanitize_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return sanitize_for_logging(url);
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:4000");
        assert!(config.database.url.is_none());
        assert!(config.uses_dev_secret());
        assert_eq!(config.token_ttl(), chrono::Duration::days(7));
        assert_eq!(config.ingestion_period(), Duration::from_secs(300));
        assert_eq!(config.security.max_request_size, 65536);
        assert!(config.security.enable_cors);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://fg:pw@db/financegram"),
            ("JWT_SECRET", "s3cret-value"),
            ("FINANCEGRAM_INGESTION_INTERVAL_SECS", "60"),
            ("FINANCEGRAM_LOG_LEVEL", "DEBUG"),
            ("FINANCEGRAM_ENABLE_CORS", "false"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://fg:pw@db/financegram")
        );
        assert!(!config.uses_dev_secret());
        assert_eq!(config.ingestion.interval_secs, 60);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.security.enable_cors);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("PORT", "0")]).is_err());
        assert!(load(&[("JWT_SECRET", "")]).is_err());
        assert!(load(&[("FINANCEGRAM_TOKEN_TTL_DAYS", "0")]).is_err());
        assert!(load(&[("FINANCEGRAM_INGESTION_INTERVAL_SECS", "0")]).is_err());
        assert!(load(&[("FINANCEGRAM_DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("FINANCEGRAM_LOG_LEVEL", "loud")]).is_err());
    }

    #[test]
    fn test_upper_bounds() {
        let config = load(&[
            ("FINANCEGRAM_TOKEN_TTL_DAYS", "365"),
            ("FINANCEGRAM_INGESTION_INTERVAL_SECS", "604800"),
        ])
        .unwrap();
        assert_eq!(config.token_ttl(), chrono::Duration::days(MAX_TOKEN_TTL_DAYS));

        assert!(load(&[("FINANCEGRAM_TOKEN_TTL_DAYS", "366")]).is_err());
        assert!(load(&[("FINANCEGRAM_TOKEN_TTL_DAYS", "100000000")]).is_err());
        assert!(load(&[("FINANCEGRAM_INGESTION_INTERVAL_SECS", "604801")]).is_err());
        assert!(
            load(&[("FINANCEGRAM_INGESTION_INTERVAL_SECS", "18446744073709551615")]).is_err()
        );
    }

    #[test]
    fn test_blank_database_url_means_memory() {
        let config = load(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_sanitize_for_logging() {
        assert_eq!(sanitize_for_logging("abc"), "***");
        assert_eq!(sanitize_for_logging("supersecretjwtkey"), "su***ey");
    }

    #[test]
    fn test_sanitize_database_url() {
        assert_eq!(
            sanitize_database_url("postgres://fg:hunter2@db:5432/financegram"),
            "postgres://fg:***@db:5432/financegram"
        );
        assert_eq!(
            sanitize_database_url("postgres://db/financegram"),
            "postgres://db/financegram"
        );
    }
}
