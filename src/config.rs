use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Seconds.
    pub access_token_ttl: u64,
    pub api_prefix: String,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    /// Only honoured when running on the in-memory store.
    pub seed_demo_data: bool,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            server_addr: var("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:5000".to_string()),
            database_url: var("DATABASE_URL"),
            jwt_secret: var("JWT_SECRET").ok_or_else(|| anyhow!("JWT_SECRET must be set"))?,
            access_token_ttl: parse_or(var("ACCESS_TOKEN_TTL"), "ACCESS_TOKEN_TTL", 604_800)?, // 7 days
            api_prefix: normalize_prefix(var("API_PREFIX").as_deref().unwrap_or("/api")),

            rate_login_per_min: parse_or(var("RATE_LOGIN_PER_MIN"), "RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parse_or(
                var("RATE_REGISTER_PER_MIN"),
                "RATE_REGISTER_PER_MIN",
                30,
            )?,
            rate_protected_per_min: parse_or(
                var("RATE_PROTECTED_PER_MIN"),
                "RATE_PROTECTED_PER_MIN",
                1000,
            )?,

            seed_demo_data: parse_or(var("SEED_DEMO_DATA"), "SEED_DEMO_DATA", true)?,
            log_dir: var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::from_source(|key| (key == "JWT_SECRET").then(|| "test-secret".to_string()))
            .expect("test config")
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value {:?}", key, v)),
        None => Ok(default),
    }
}

/// `api`, `/api/` and `/api` all become `/api`; an empty prefix mounts at root.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
