//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `PORTFOLIO_ENV` - `development` (default) or `production`
//! - `DATABASE_URL` - `PostgreSQL` connection string, or `memory://` for an
//!   in-process store (default: `postgres://localhost:5432/portfolio`)
//! - `JWT_SECRET` - Token signing secret (min 32 chars, high entropy in production)
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 2005)
//! - `STATIC_DIR` - Directory served for non-API paths (default: `static`)
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origins (default: any origin)
//! - `RATE_LIMIT_ENABLED` - Per-IP limits on login/setup/contact (default: true)
//! - `TRUST_PROXY_HEADERS` - Key rate limits on the right-most `X-Forwarded-For`
//!   hop instead of the peer address; only enable behind a reverse proxy
//!   (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_TRACES_SAMPLE_RATE` - Fraction of requests traced (default: 0.0)
//!
//! Outside production, missing `DATABASE_URL` and `JWT_SECRET` fall back to
//! hardcoded local-development values. In production both must be set and the
//! secret must pass the strength checks. Loading usually happens before logging
//! is set up, so fallbacks are recorded and reported by
//! [`ServerConfig::log_defaults`].

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEV_DATABASE_URL: &str = "postgres://localhost:5432/portfolio";
const DEV_JWT_SECRET: &str = "local-development-only-jwt-signing-key";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "development",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Which document store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Document store connection URL (may contain a password)
    pub database_url: SecretString,
    /// Bearer token signing secret
    pub jwt_secret: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the public site and admin console assets
    pub static_dir: PathBuf,
    /// Allowed CORS origins; `None` allows any origin
    pub cors_allowed_origins: Option<Vec<String>>,
    /// Whether per-IP rate limits apply to the public write endpoints
    pub rate_limit_enabled: bool,
    /// Whether rate limits key on proxy headers rather than the peer address
    pub trust_proxy_headers: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Fraction of requests sent to Sentry as transactions
    pub sentry_traces_sample_rate: f32,
    /// Warnings for development fallbacks taken while loading
    pub defaults_applied: Vec<&'static str>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, or if production
    /// settings are missing or fail secret validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let environment = match vars.or_default("PORTFOLIO_ENV", "development").as_str() {
            "production" | "prod" => Environment::Production,
            "development" | "dev" | "test" => Environment::Development,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "PORTFOLIO_ENV".to_owned(),
                    format!("unknown environment '{other}'"),
                ));
            }
        };

        let mut defaults_applied = Vec::new();
        let (database_url, jwt_secret) = match environment {
            Environment::Production => {
                let database_url = vars.required("DATABASE_URL")?;
                let jwt_secret = vars.required("JWT_SECRET")?;
                validate_secret_length(&jwt_secret, "JWT_SECRET")?;
                validate_secret_strength(&jwt_secret, "JWT_SECRET")?;
                (database_url, jwt_secret)
            }
            Environment::Development => {
                let database_url = vars.optional("DATABASE_URL").unwrap_or_else(|| {
                    defaults_applied.push("DATABASE_URL not set, using local development default");
                    DEV_DATABASE_URL.to_owned()
                });
                let jwt_secret = vars.optional("JWT_SECRET").unwrap_or_else(|| {
                    defaults_applied.push("JWT_SECRET not set, using insecure development secret");
                    DEV_JWT_SECRET.to_owned()
                });
                (database_url, jwt_secret)
            }
        };

        let host = vars
            .or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_owned(), e.to_string()))?;
        let port = vars
            .or_default("PORT", "2005")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_owned(), e.to_string()))?;
        let static_dir = PathBuf::from(vars.or_default("STATIC_DIR", "static"));
        let cors_allowed_origins = vars.optional("CORS_ALLOWED_ORIGINS").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect()
        });
        let rate_limit_enabled = vars.flag("RATE_LIMIT_ENABLED", true)?;
        let trust_proxy_headers = vars.flag("TRUST_PROXY_HEADERS", false)?;
        let sentry_traces_sample_rate = vars
            .or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_TRACES_SAMPLE_RATE".to_owned(), e.to_string())
            })?;

        Ok(Self {
            environment,
            database_url: SecretString::from(database_url),
            jwt_secret: SecretString::from(jwt_secret),
            host,
            port,
            static_dir,
            cors_allowed_origins,
            rate_limit_enabled,
            trust_proxy_headers,
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_traces_sample_rate,
            defaults_applied,
        })
    }

    /// Configuration for tests and local tooling: in-memory store, fixed
    /// secret, no rate limits.
    #[must_use]
    pub fn for_memory_store(jwt_secret: &str) -> Self {
        Self {
            environment: Environment::Development,
            database_url: SecretString::from("memory://"),
            jwt_secret: SecretString::from(jwt_secret),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            static_dir: PathBuf::from("static"),
            cors_allowed_origins: None,
            rate_limit_enabled: false,
            trust_proxy_headers: false,
            sentry_dsn: None,
            sentry_traces_sample_rate: 0.0,
            defaults_applied: Vec::new(),
        }
    }

    /// Emit a warning for each development fallback taken while loading.
    ///
    /// Call once the tracing subscriber is installed.
    pub fn log_defaults(&self) {
        for warning in &self.defaults_applied {
            tracing::warn!("{warning}");
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The store implementation selected by the database URL scheme.
    #[must_use]
    pub fn store_backend(&self) -> StoreBackend {
        if self.database_url.expose_secret().starts_with("memory:") {
            StoreBackend::Memory
        } else {
            StoreBackend::Postgres
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_owned())
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        self.optional(key).map_or(Ok(default), |raw| {
            parse_bool(&raw).ok_or_else(|| {
                ConfigError::InvalidEnvVar(key.to_owned(), "expected true or false".to_owned())
            })
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                secret.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const STRONG_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6v";

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_development_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.port, 2005);
        assert_eq!(config.socket_addr().ip().to_string(), "127.0.0.1");
        assert_eq!(config.database_url.expose_secret(), DEV_DATABASE_URL);
        assert_eq!(config.jwt_secret.expose_secret(), DEV_JWT_SECRET);
        assert_eq!(config.store_backend(), StoreBackend::Postgres);
        assert!(config.rate_limit_enabled);
        assert!(!config.trust_proxy_headers);
        assert!(config.cors_allowed_origins.is_none());
    }

    #[test]
    fn test_development_fallbacks_are_recorded() {
        let config = load(&[]).unwrap();
        assert_eq!(config.defaults_applied.len(), 2);
        assert!(config.defaults_applied[0].starts_with("DATABASE_URL"));
        assert!(config.defaults_applied[1].starts_with("JWT_SECRET"));

        let config = load(&[("DATABASE_URL", "memory://"), ("JWT_SECRET", STRONG_SECRET)]).unwrap();
        assert!(config.defaults_applied.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("HOST", "0.0.0.0"),
            ("DATABASE_URL", "memory://"),
            ("CORS_ALLOWED_ORIGINS", "https://a.dev, https://b.dev,"),
            ("RATE_LIMIT_ENABLED", "false"),
            ("TRUST_PROXY_HEADERS", "yes"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().port(), 8080);
        assert_eq!(config.store_backend(), StoreBackend::Memory);
        assert_eq!(
            config.cors_allowed_origins.unwrap(),
            vec!["https://a.dev".to_owned(), "https://b.dev".to_owned()]
        );
        assert!(!config.rate_limit_enabled);
        assert!(config.trust_proxy_headers);
    }

    #[test]
    fn test_invalid_flag() {
        assert!(matches!(
            load(&[("TRUST_PROXY_HEADERS", "maybe")]),
            Err(ConfigError::InvalidEnvVar(var, _)) if var == "TRUST_PROXY_HEADERS"
        ));
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            load(&[("PORT", "not-a-port")]),
            Err(ConfigError::InvalidEnvVar(var, _)) if var == "PORT"
        ));
    }

    #[test]
    fn test_production_requires_settings() {
        assert!(matches!(
            load(&[("PORTFOLIO_ENV", "production")]),
            Err(ConfigError::MissingEnvVar(var)) if var == "DATABASE_URL"
        ));
        assert!(matches!(
            load(&[("PORTFOLIO_ENV", "production"), ("DATABASE_URL", "postgres://db/p")]),
            Err(ConfigError::MissingEnvVar(var)) if var == "JWT_SECRET"
        ));
    }

    #[test]
    fn test_production_rejects_weak_secret() {
        let result = load(&[
            ("PORTFOLIO_ENV", "production"),
            ("DATABASE_URL", "postgres://db/p"),
            ("JWT_SECRET", "superdad10"),
        ]);
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_production_accepts_strong_secret() {
        let config = load(&[
            ("PORTFOLIO_ENV", "production"),
            ("DATABASE_URL", "postgres://db/p"),
            ("JWT_SECRET", STRONG_SECRET),
        ])
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_dev_secret_would_fail_production_checks() {
        assert!(validate_secret_strength(DEV_JWT_SECRET, "JWT_SECRET").is_err());
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy(STRONG_SECRET) > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&[("JWT_SECRET", STRONG_SECRET)]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains(STRONG_SECRET));
        assert!(!debug_output.contains(DEV_DATABASE_URL));
    }
}
