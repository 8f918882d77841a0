//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;

/// Default lifetime of issued session cookies (24 h).
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Upper bound on `SESSION_TTL_SECS` (one year).
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Which persistence backend the composition root wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL via `sqlx`. Disabled when `DATABASE_URL` is absent.
    Postgres,
    /// Process-local store, lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown STORE_BACKEND: {other}")),
        }
    }
}

/// A fixed-window rate limit: at most `max_requests` per `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl RateLimitConfig {
    /// Creates a new rate limit config.
    #[must_use]
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`AppConfig::from_env`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Selected persistence backend.
    pub store_backend: StoreBackend,

    /// PostgreSQL connection string. `None` puts the service in degraded
    /// mode when the Postgres backend is selected.
    pub database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Minimum idle connections in the pool.
    pub database_min_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Apply embedded migrations at startup.
    pub run_migrations: bool,

    /// Fallback administrator designation.
    pub admin_email: Option<String>,

    /// HMAC key for session cookies. `None` means nobody is authenticated.
    pub session_secret: Option<String>,

    /// Lifetime of issued session cookies.
    pub session_ttl_secs: u64,

    /// Enables the email-only `POST /auth/login` endpoint.
    pub dev_login_enabled: bool,

    /// Idea submissions per client origin.
    pub submission_rate_limit: RateLimitConfig,

    /// Vote casts/removals per client origin.
    pub vote_rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` cannot be parsed as a
    /// [`SocketAddr`] or `STORE_BACKEND` names an unknown backend.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let store_backend: StoreBackend = std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()
            .map_err(anyhow::Error::msg)?;

        let database_url = non_empty_env("DATABASE_URL").filter(|url| !url.contains("placeholder"));

        Ok(Self {
            listen_addr,
            store_backend,
            database_url,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10),
            database_min_connections: parse_env("DATABASE_MIN_CONNECTIONS", 0),
            database_connect_timeout_secs: parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5),
            run_migrations: parse_env_bool("DATABASE_RUN_MIGRATIONS", false),
            admin_email: non_empty_env("ADMIN_EMAIL"),
            session_secret: non_empty_env("SESSION_SECRET"),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)
                .min(MAX_SESSION_TTL_SECS),
            dev_login_enabled: parse_env_bool("DEV_LOGIN_ENABLED", false),
            submission_rate_limit: RateLimitConfig::new(
                parse_env("SUBMISSION_RATE_LIMIT", 10),
                parse_env("SUBMISSION_RATE_WINDOW_SECS", 15 * 60),
            ),
            vote_rate_limit: RateLimitConfig::new(
                parse_env("VOTE_RATE_LIMIT", 10),
                parse_env("VOTE_RATE_WINDOW_SECS", 60),
            ),
        })
    }

    /// Configuration for tests and local experiments: in-memory store,
    /// default limits, no session secret.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            store_backend: StoreBackend::Memory,
            database_url: None,
            database_max_connections: 10,
            database_min_connections: 0,
            database_connect_timeout_secs: 5,
            run_migrations: false,
            admin_email: None,
            session_secret: None,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            dev_login_enabled: false,
            submission_rate_limit: RateLimitConfig::new(10, 15 * 60),
            vote_rate_limit: RateLimitConfig::new(10, 60),
        }
    }

    /// Session lifetime as a duration, capped at [`MAX_SESSION_TTL_SECS`].
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        i64::try_from(self.session_ttl_secs.min(MAX_SESSION_TTL_SECS))
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(Duration::zero)
    }
}

/// Reads a variable, treating empty or whitespace-only values as unset.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    parse_bool(std::env::var(key).ok().as_deref(), default)
}

fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
