use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_address: SocketAddr,
    pub storage_dir: PathBuf,
    /// Base used when building file preview and avatar URLs.
    pub public_url: String,
    pub session_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_address: try_load("BIND_ADDRESS", "127.0.0.1:3001")?,
            storage_dir: try_load("STORAGE_DIR", "./storage")?,
            public_url: try_load::<String>("PUBLIC_URL", "http://localhost:3001")?
                .trim_end_matches('/')
                .to_owned(),
            session_ttl_days: try_load("SESSION_TTL_DAYS", "90")?,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value {value:?}: {e}"))
}
