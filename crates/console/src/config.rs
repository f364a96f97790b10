//! Console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BAZAAR_CATALOG_URL` - Origin serving `products` and `categories` (default: <http://localhost:3000>)
//! - `BAZAAR_MEMBERS_URL` - Origin serving `members` (default: <http://localhost:3001>)
//! - `BAZAAR_API_TOKEN` - Bearer token sent with every collection request
//! - `BAZAAR_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: none)
//! - `BAZAAR_REDIRECT_DELAY_MS` - Delay before post-submit redirects (default: 1500)
//! - `BAZAAR_NOTIFICATION_TTL_MS` - Notification auto-dismiss (default: 6000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_CATALOG_URL: &str = "http://localhost:3000";
const DEFAULT_MEMBERS_URL: &str = "http://localhost:3001";
const DEFAULT_REDIRECT_DELAY_MS: u64 = 1500;
const DEFAULT_NOTIFICATION_TTL_MS: u64 = 6000;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Console configuration.
#[derive(Clone)]
pub struct ConsoleConfig {
    /// Origin for the `products` and `categories` collections
    pub catalog_url: Url,
    /// Origin for the `members` collection
    pub members_url: Url,
    /// Optional bearer token for the collection service
    pub api_token: Option<SecretString>,
    /// Optional request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    /// Delay before redirecting to a listing after a successful submit
    pub redirect_delay: Duration,
    /// How long a notification stays visible
    pub notification_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ConsoleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleConfig")
            .field("catalog_url", &self.catalog_url.as_str())
            .field("members_url", &self.members_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .field("redirect_delay", &self.redirect_delay)
            .field("notification_ttl", &self.notification_ttl)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let catalog_url = parse_origin(
            "BAZAAR_CATALOG_URL",
            &lookup("BAZAAR_CATALOG_URL").unwrap_or_else(|| DEFAULT_CATALOG_URL.to_owned()),
        )?;
        let members_url = parse_origin(
            "BAZAAR_MEMBERS_URL",
            &lookup("BAZAAR_MEMBERS_URL").unwrap_or_else(|| DEFAULT_MEMBERS_URL.to_owned()),
        )?;

        let api_token = lookup("BAZAAR_API_TOKEN").map(|token| {
            if let Err(e) = validate_secret_strength(&token, "BAZAAR_API_TOKEN") {
                tracing::warn!("BAZAAR_API_TOKEN validation warning: {e}");
            }
            SecretString::from(token)
        });

        let request_timeout = lookup("BAZAAR_REQUEST_TIMEOUT_SECS")
            .map(|raw| parse_u64("BAZAAR_REQUEST_TIMEOUT_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);

        let redirect_delay = lookup("BAZAAR_REDIRECT_DELAY_MS")
            .map(|raw| parse_u64("BAZAAR_REDIRECT_DELAY_MS", &raw))
            .transpose()?
            .map_or(
                Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
                Duration::from_millis,
            );

        let notification_ttl = lookup("BAZAAR_NOTIFICATION_TTL_MS")
            .map(|raw| parse_u64("BAZAAR_NOTIFICATION_TTL_MS", &raw))
            .transpose()?
            .map_or(
                Duration::from_millis(DEFAULT_NOTIFICATION_TTL_MS),
                Duration::from_millis,
            );

        Ok(Self {
            catalog_url,
            members_url,
            api_token,
            request_timeout,
            redirect_delay,
            notification_ttl,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at explicit origins with default timings.
    #[must_use]
    pub const fn local(catalog_url: Url, members_url: Url) -> Self {
        Self {
            catalog_url,
            members_url,
            api_token: None,
            request_timeout: None,
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            notification_ttl: Duration::from_millis(DEFAULT_NOTIFICATION_TTL_MS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Origin that serves the given collection.
    #[must_use]
    pub fn origin_for(&self, collection: &str) -> &Url {
        if collection == "members" {
            &self.members_url
        } else {
            &self.catalog_url
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_origin(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("unsupported scheme '{}', expected http or https", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    let mut counts = std::collections::HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_insert(0usize) += 1;
    }
    let len = s.chars().count() as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
