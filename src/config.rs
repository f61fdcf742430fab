// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! Configuration is validated eagerly at startup and failures are treated
//! as deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// Fails fast with "Missing required configuration: KEY" when absent.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// Single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub session: session::SessionConfig,
    pub admin: admin::AdminConfig,
    pub server: server::ServerConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            storage: StorageConfig::from_env()?,
            session: session::SessionConfig::from_env()?,
            admin: admin::AdminConfig::from_env()?,
            server: server::ServerConfig::from_env()?,
        })
    }
}

// ============================================================
// Storage backend selection
// ============================================================

/// Which backends hold users and sessions.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Users in PostgreSQL, sessions in Redis.
    Postgres {
        database: database::DatabaseConfig,
        redis: redis::RedisConfig,
    },
    /// Both stores in process memory. Nothing survives a restart.
    Memory,
}

impl StorageConfig {
    /// Reads `PORTAL_STORAGE_TYPE` (`postgres` by default, or `memory`).
    pub fn from_env() -> Result<Self> {
        // ---
        let kind = std::env::var("PORTAL_STORAGE_TYPE").unwrap_or_else(|_| "postgres".to_string());
        match kind.as_str() {
            "memory" => Ok(StorageConfig::Memory),
            "postgres" => Ok(StorageConfig::Postgres {
                database: database::DatabaseConfig::from_env()?,
                redis: redis::RedisConfig::from_env()?,
            }),
            other => Err(anyhow::anyhow!(
                "Invalid PORTAL_STORAGE_TYPE `{other}` (expected `postgres` or `memory`)"
            )),
        }
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of connection attempts at startup. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a pooled connection. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of idle connections kept in the pool. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of open connections. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `DATABASE_URL` is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("PORTAL_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs =
                optional_env_parse!("PORTAL_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("PORTAL_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("PORTAL_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Redis configuration
// ============================================================

mod redis {
    // ---
    use super::*;

    /// Redis connection settings for the session store.
    #[derive(Debug, Clone)]
    pub struct RedisConfig {
        /// Redis connection string.
        pub url: String,
    }

    impl RedisConfig {
        /// Builds a [`RedisConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `PORTAL_REDIS_URL` is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let url = required_env!("PORTAL_REDIS_URL");
            Ok(Self { url })
        }
    }
}
pub use redis::RedisConfig;

// ============================================================
// Session configuration
// ============================================================

mod session {
    // ---
    use super::*;

    /// Longest accepted session lifetime: 365 days.
    pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

    /// Session lifetime and cookie attributes.
    #[derive(Debug, Clone)]
    pub struct SessionConfig {
        /// Fixed lifetime of a session from issuance. Defaults to 24 hours.
        pub ttl: Duration,

        /// Add `Secure` to the session cookie. Enable when served over HTTPS.
        pub cookie_secure: bool,
    }

    impl SessionConfig {
        pub fn from_env() -> Result<Self> {
            // ---
            let ttl_secs = optional_env_parse!("PORTAL_SESSION_TTL_SEC", u64, 86_400);
            let cookie_secure = optional_env_parse!("PORTAL_SESSION_COOKIE_SECURE", bool, false);

            if !(1..=MAX_SESSION_TTL_SECS).contains(&ttl_secs) {
                anyhow::bail!(
                    "PORTAL_SESSION_TTL_SEC out of range (1..={MAX_SESSION_TTL_SECS}): {ttl_secs}"
                );
            }

            Ok(Self {
                ttl: Duration::from_secs(ttl_secs),
                cookie_secure,
            })
        }
    }

    impl Default for SessionConfig {
        fn default() -> Self {
            Self {
                ttl: Duration::from_secs(86_400),
                cookie_secure: false,
            }
        }
    }
}
pub use session::SessionConfig;

// ============================================================
// Admin operator credential
// ============================================================

mod admin {
    // ---
    use super::*;

    /// The static operator credential used by the admin login flow.
    ///
    /// The operator is not a stored user; only its email and a bcrypt hash
    /// of its password are known to the process.
    #[derive(Clone)]
    pub struct AdminConfig {
        pub email: String,
        pub password_hash: String,
    }

    impl std::fmt::Debug for AdminConfig {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("AdminConfig")
                .field("email", &self.email)
                .field("password_hash", &"<redacted>")
                .finish()
        }
    }

    impl AdminConfig {
        /// Builds an [`AdminConfig`] from `ADMIN_EMAIL` and `ADMIN_PASSWORD_HASH`.
        ///
        /// # Errors
        /// Both variables are required; the admin panel is unreachable without them.
        pub fn from_env() -> Result<Self> {
            // ---
            let email = required_env!("ADMIN_EMAIL").trim().to_string();
            let password_hash = required_env!("ADMIN_PASSWORD_HASH");

            Ok(Self {
                email,
                password_hash,
            })
        }
    }
}
pub use admin::AdminConfig;

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// Listener address and process-wide tuning knobs.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Socket address to bind. Defaults to `127.0.0.1:3000`.
        pub bind_addr: String,

        /// bcrypt work factor for new password hashes. Defaults to 10.
        pub bcrypt_cost: u32,

        /// `noop` (default) or `prom`.
        pub metrics_type: String,
    }

    impl ServerConfig {
        pub fn from_env() -> Result<Self> {
            // ---
            let bind_addr =
                std::env::var("PORTAL_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
            let bcrypt_cost = optional_env_parse!("PORTAL_BCRYPT_COST", u32, 10);
            let metrics_type =
                std::env::var("PORTAL_METRICS_TYPE").unwrap_or_else(|_| "noop".to_string());

            if !(4..=31).contains(&bcrypt_cost) {
                anyhow::bail!("PORTAL_BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}");
            }

            Ok(Self {
                bind_addr,
                bcrypt_cost,
                metrics_type,
            })
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Tests
// ============================================================
