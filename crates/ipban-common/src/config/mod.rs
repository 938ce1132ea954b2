//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, IpBanConfig,
    JwtConfig, RateLimitConfig, ServerConfig, DEFAULT_BAN_MESSAGE, MAX_CACHE_TTL_SECS,
    MIN_CACHE_TTL_SECS,
};
