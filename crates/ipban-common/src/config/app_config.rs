//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Notice shown to banned requesters unless `IPBAN_MESSAGE` overrides it
pub const DEFAULT_BAN_MESSAGE: &str = "<p>IP <b>$IP</b> has been banned until <b>$DATE</b> by <b>$ADMIN</b> because of <b>$REASON</b>
<p>If you couldn't possibly be guilty of what you're banned for, the person we banned probably had a dynamic IP address and so do you.
<p>See <a href=\"http://whatismyipaddress.com/dynamic-static\">http://whatismyipaddress.com/dynamic-static</a> for more information.
<p>$CONTACT";

/// Shortest accepted `IPBAN_CACHE_TTL_SECS`
pub const MIN_CACHE_TTL_SECS: u64 = 1;
/// Longest accepted `IPBAN_CACHE_TTL_SECS` (one day)
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub ipban: IpBanConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// IP ban enforcement settings
#[derive(Debug, Clone, Deserialize)]
pub struct IpBanConfig {
    /// Notice template; `$IP`, `$DATE`, `$ADMIN`, `$REASON` and `$CONTACT` are substituted
    #[serde(default = "default_ban_message")]
    pub message: String,
    /// Where banned users can reach the staff
    #[serde(default)]
    pub contact_link: Option<String>,
    /// How long a built ban index is served before it is rebuilt
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for IpBanConfig {
    fn default() -> Self {
        Self {
            message: default_ban_message(),
            contact_link: None,
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "ipban-server".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_ban_message() -> String {
    DEFAULT_BAN_MESSAGE.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    600 // 10 minutes
}

/// Read and parse an optional variable, falling back to `default` when unset
fn var_or<T: FromStr>(name: &'static str, default: fn() -> T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default()),
    }
}

/// Read and parse a required variable
fn required_var<T: FromStr>(name: &'static str) -> Result<T, ConfigError> {
    let raw = env::var(name).map_err(|_| ConfigError::MissingVar(name))?;
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name, raw))
}

/// Reject cache windows outside `MIN_CACHE_TTL_SECS..=MAX_CACHE_TTL_SECS`
fn check_cache_ttl(secs: u64) -> Result<u64, ConfigError> {
    if (MIN_CACHE_TTL_SECS..=MAX_CACHE_TTL_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(ConfigError::OutOfRange {
            name: "IPBAN_CACHE_TTL_SECS",
            value: secs,
            min: MIN_CACHE_TTL_SECS,
            max: MAX_CACHE_TTL_SECS,
        })
    }
}

/// Unset and blank variables both count as absent
fn optional_var(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or a
    /// value cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: var_or("APP_ENV", default_env)?,
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: required_var("API_PORT")?,
            },
            database: DatabaseConfig {
                url: required_var("DATABASE_URL")?,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: var_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            jwt: JwtConfig {
                secret: required_var("JWT_SECRET")?,
                access_token_expiry: var_or("JWT_ACCESS_TOKEN_EXPIRY", default_access_token_expiry)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: var_or(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: var_or("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
            ipban: IpBanConfig {
                message: env::var("IPBAN_MESSAGE").unwrap_or_else(|_| default_ban_message()),
                contact_link: optional_var("IPBAN_CONTACT_LINK"),
                cache_ttl_secs: check_cache_ttl(var_or(
                    "IPBAN_CACHE_TTL_SECS",
                    default_cache_ttl_secs,
                )?)?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}
