//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::constants::{
    DEFAULT_ARGON2_ITERATIONS, DEFAULT_ARGON2_MEMORY_KIB, DEFAULT_ARGON2_PARALLELISM,
    DEFAULT_DATABASE_URL, DEFAULT_DB_CONNECT_TIMEOUT_SECS, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_DB_MIN_CONNECTIONS, DEFAULT_GEOCODER_TIMEOUT_SECS, DEFAULT_GEOCODER_URL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_TRANSACTION_TIMEOUT_SECS,
    DEFAULT_UPLOAD_DIR, MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
            iterations: DEFAULT_ARGON2_ITERATIONS,
            parallelism: DEFAULT_ARGON2_PARALLELISM,
        }
    }
}

/// Application configuration
///
/// Built once at startup and shared read-only afterwards. The signing key
/// never leaves this struct except as bytes for the token codec.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_connect_timeout: Duration,
    pub transaction_timeout: Duration,
    jwt_secret: String,
    pub hashing: HashingCost,
    pub geocoder_url: String,
    pub geocoder_timeout: Duration,
    pub upload_dir: String,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("transaction_timeout", &self.transaction_timeout)
            .field("jwt_secret", &"[REDACTED]")
            .field("hashing", &self.hashing)
            .field("geocoder_url", &self.geocoder_url)
            .field("geocoder_timeout", &self.geocoder_timeout)
            .field("upload_dir", &self.upload_dir)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Build a configuration with defaults around the given signing key.
    ///
    /// # Errors
    /// Returns an internal error if the secret is shorter than
    /// `MIN_JWT_SECRET_LENGTH` bytes.
    pub fn new(jwt_secret: impl Into<String>) -> AppResult<Self> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            db_min_connections: DEFAULT_DB_MIN_CONNECTIONS,
            db_connect_timeout: Duration::from_secs(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
            transaction_timeout: Duration::from_secs(DEFAULT_TRANSACTION_TIMEOUT_SECS),
            jwt_secret,
            hashing: HashingCost::default(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            geocoder_timeout: Duration::from_secs(DEFAULT_GEOCODER_TIMEOUT_SECS),
            upload_dir: DEFAULT_UPLOAD_DIR.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        })
    }

    /// Load configuration from environment variables (and `.env`).
    ///
    /// # Errors
    /// Fails if JWT_SECRET is missing in a release build or is too short.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        let mut config = Self::new(jwt_secret)?;

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(url) = env::var("GEOCODER_URL") {
            config.geocoder_url = url;
        }
        if let Ok(dir) = env::var("UPLOAD_DIR") {
            config.upload_dir = dir;
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            config.server_host = host;
        }
        config.server_port = parse_var("SERVER_PORT", config.server_port);
        config.db_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", config.db_max_connections);
        config.db_min_connections = parse_var("DATABASE_MIN_CONNECTIONS", config.db_min_connections);
        config.geocoder_timeout = nonzero_secs(
            "GEOCODER_TIMEOUT_SECS",
            parse_var("GEOCODER_TIMEOUT_SECS", config.geocoder_timeout.as_secs()),
        )?;
        config.transaction_timeout = nonzero_secs(
            "TRANSACTION_TIMEOUT_SECS",
            parse_var("TRANSACTION_TIMEOUT_SECS", config.transaction_timeout.as_secs()),
        )?;
        config.hashing = HashingCost {
            memory_kib: parse_var("ARGON2_MEMORY_KIB", config.hashing.memory_kib),
            iterations: parse_var("ARGON2_ITERATIONS", config.hashing.iterations),
            parallelism: parse_var("ARGON2_PARALLELISM", config.hashing.parallelism),
        };

        Ok(config)
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parse an optional environment variable, falling back on absence or junk.
fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// A zero deadline would fail every call it bounds.
fn nonzero_secs(key: &str, secs: u64) -> AppResult<Duration> {
    if secs == 0 {
        return Err(AppError::internal(format!("{} must be greater than zero", key)));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_is_rejected() {
        assert!(Config::new("too-short").is_err());
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        let err = nonzero_secs("TRANSACTION_TIMEOUT_SECS", 0).unwrap_err();
        assert!(matches!(err, AppError::Internal(ref msg) if msg.contains("TRANSACTION_TIMEOUT_SECS")));
        assert!(nonzero_secs("GEOCODER_TIMEOUT_SECS", 0).is_err());
        assert_eq!(
            nonzero_secs("GEOCODER_TIMEOUT_SECS", 5).unwrap(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::new("a-secret-that-is-long-enough-for-hs256").unwrap();
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.hashing, HashingCost::default());
        assert_eq!(config.upload_dir, DEFAULT_UPLOAD_DIR);
        assert_eq!(config.server_addr(), format!("0.0.0.0:{}", DEFAULT_SERVER_PORT));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::new("a-secret-that-is-long-enough-for-hs256").unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("long-enough"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
