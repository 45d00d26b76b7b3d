use std::{env, str::FromStr};
use thiserror::Error;

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded and
/// pulled into handlers and extractors through `FromRef<AppState>`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls fail-fast checks, log format and seeding.
    pub env: Env,
    // Postgres connection string. Absent in local mode means the in-memory store.
    pub db_url: Option<String>,
    // Symmetric HS256 secret used to sign and validate bearer tokens.
    pub jwt_secret: String,
    // Lifetime of issued tokens.
    pub jwt_ttl_seconds: i64,
    pub bcrypt_cost: u32,
    // Whether POST /seed may populate the store.
    pub seed_enabled: bool,
    pub bind_addr: String,
    // S3-compatible storage for athlete media (MinIO locally).
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_key: String,
    pub s3_secret: String,
    pub s3_bucket: String,
}

/// Env
///
/// Defines the runtime context: local development conveniences vs. hardened production.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set when APP_ENV=production")]
    MissingInProduction(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

// One year.
const MAX_JWT_TTL_SECONDS: i64 = 60 * 60 * 24 * 365;

const LOCAL_JWT_SECRET: &str = "sportex-local-development-secret";

impl Default for AppConfig {
    /// default
    ///
    /// Safe, non-panicking values for test state scaffolding. Uses the in-memory
    /// store and the minimum bcrypt cost so hashing does not dominate test time.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            jwt_ttl_seconds: 60 * 60 * 24,
            bcrypt_cost: 4,
            seed_enabled: true,
            bind_addr: "127.0.0.1:8000".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_key: "admin".to_string(),
            s3_secret: "password".to_string(),
            s3_bucket: "sportex-test".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. Production refuses to
    /// start without its database, token secret and storage credentials; local
    /// mode falls back to development defaults for each of them.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        if env == Env::Production && db_url.is_none() {
            return Err(ConfigError::MissingInProduction("DATABASE_URL"));
        }

        let jwt_secret = match env {
            Env::Production => required("JWT_SECRET")?,
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        let jwt_ttl_seconds = parse_or("JWT_TTL_SECONDS", 60 * 60 * 24)?;
        if !(1..=MAX_JWT_TTL_SECONDS).contains(&jwt_ttl_seconds) {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_SECONDS",
                value: jwt_ttl_seconds.to_string(),
            });
        }

        let bcrypt_cost = parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let seed_enabled = parse_or("SEED_ENABLED", env == Env::Local)?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let config = match env {
            Env::Local => Self {
                env,
                db_url,
                jwt_secret,
                jwt_ttl_seconds,
                bcrypt_cost,
                seed_enabled,
                bind_addr,
                s3_endpoint: env::var("S3_ENDPOINT")
                    .unwrap_or_else(|_| "http://localhost:9000".to_string()),
                s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                s3_key: env::var("S3_ACCESS_KEY").unwrap_or_else(|_| "admin".to_string()),
                s3_secret: env::var("S3_SECRET_KEY").unwrap_or_else(|_| "password".to_string()),
                s3_bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "sportex-media".to_string()),
            },
            Env::Production => Self {
                env,
                db_url,
                jwt_secret,
                jwt_ttl_seconds,
                bcrypt_cost,
                seed_enabled,
                bind_addr,
                s3_endpoint: required("S3_ENDPOINT")?,
                s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                s3_key: required("S3_ACCESS_KEY")?,
                s3_secret: required("S3_SECRET_KEY")?,
                s3_bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "sportex-media".to_string()),
            },
        };

        Ok(config)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingInProduction(name))
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}
