/// Configuration management for the API server
///
/// Configuration is read once at startup and passed explicitly into the
/// application state; nothing reads the environment after that.
///
/// # Environment Variables
///
/// - `API_HOST` / `API_PORT`: bind address (default `0.0.0.0:8080`)
/// - `STORAGE_BACKEND`: `postgres` (default) or `memory`
/// - `DATABASE_URL`: PostgreSQL connection string (required for `postgres`)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default 10)
/// - `JWT_SECRET`: HS256 signing key, at least 32 characters (required)
/// - `ACCESS_TOKEN_EXPIRE_MINUTES`: token lifetime (default 15)
/// - `CORS_ORIGINS`: comma-separated origins, `*` for any (default `*`)
/// - `COOKIE_SECURE`: mark the auth cookie `Secure` (default false)
/// - `PRODUCTION`: enable HSTS (default false)
/// - `TASKS_DEFAULT_PAGE_SIZE` / `TASKS_MAX_PAGE_SIZE`: list paging (default 20 / 100)
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use todo_api::config::{Config, StorageBackend};
///
/// let vars = HashMap::from([
///     ("JWT_SECRET", "an-example-secret-that-is-32-chars!"),
///     ("STORAGE_BACKEND", "memory"),
///     ("API_PORT", "3000"),
/// ]);
///
/// let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
/// assert_eq!(config.storage.backend, StorageBackend::Memory);
/// assert_eq!(config.bind_address(), "0.0.0.0:3000");
/// ```

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use todo_shared::db::pool::DatabaseConfig;
use todo_shared::services::tasks::{PaginationConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub tasks: TaskListConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Add `Secure` to the auth cookie
    pub cookie_secure: bool,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Which storage backend serves requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("unknown storage backend '{}'", other)),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// PostgreSQL connection URL; empty for the memory backend
    pub database_url: String,

    pub max_connections: u32,
}

/// Token configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HS256 signing
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,
}

/// Task listing limits
#[derive(Debug, Clone, Copy)]
pub struct TaskListConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Config {
    /// Loads configuration from the process environment (and `.env`, if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a value fails to
    /// parse, or `JWT_SECRET` is shorter than 32 characters.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(&lookup, "API_PORT", 8080)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let cookie_secure = parse_flag(&lookup, "COOKIE_SECURE")?;
        let production = parse_flag(&lookup, "PRODUCTION")?;

        let backend: StorageBackend = parse_or(&lookup, "STORAGE_BACKEND", StorageBackend::Postgres)?;
        let database_url = lookup("DATABASE_URL").unwrap_or_default();
        if backend == StorageBackend::Postgres && database_url.is_empty() {
            bail!("DATABASE_URL environment variable is required for the postgres backend");
        }
        let max_connections: u32 = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;

        let secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow!("JWT_SECRET environment variable is required"))?;
        if secret.chars().count() < MIN_JWT_SECRET_LEN {
            bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LEN);
        }

        let access_token_expire_minutes: i64 = parse_or(&lookup, "ACCESS_TOKEN_EXPIRE_MINUTES", 15)?;
        if access_token_expire_minutes <= 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be positive");
        }

        let default_page_size: i64 = parse_or(&lookup, "TASKS_DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let max_page_size: i64 = parse_or(&lookup, "TASKS_MAX_PAGE_SIZE", MAX_PAGE_SIZE)?;
        if default_page_size < 1 || max_page_size < default_page_size {
            bail!("Task page sizes must satisfy 1 <= TASKS_DEFAULT_PAGE_SIZE <= TASKS_MAX_PAGE_SIZE");
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                cookie_secure,
                production,
            },
            storage: StorageConfig {
                backend,
                database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret,
                access_token_expire_minutes,
            },
            tasks: TaskListConfig {
                default_page_size,
                max_page_size,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Access token lifetime
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.jwt.access_token_expire_minutes)
    }

    pub fn pagination(&self) -> PaginationConfig {
        PaginationConfig {
            default_limit: self.tasks.default_page_size,
            max_limit: self.tasks.max_page_size,
        }
    }

    /// Pool settings for the postgres backend
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.storage.database_url.clone(),
            max_connections: self.storage.max_connections,
            ..Default::default()
        }
    }

    /// Whether any origin is allowed
    pub fn cors_allows_any(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
        None => Ok(default),
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> anyhow::Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if ["1", "true", "yes", "on"].iter().any(|t| v.eq_ignore_ascii_case(t)) => Ok(true),
        Some(v) if ["0", "false", "no", "off"].iter().any(|f| v.eq_ignore_ascii_case(f)) => Ok(false),
        Some(v) => bail!("{} has an invalid boolean value '{}'", key, v),
    }
}
