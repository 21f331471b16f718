use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";
pub const DEFAULT_LINE_DATA_API_BASE: &str = "https://api-data.line.me";
/// Webhook deliveries accepted per second before `/callback` answers 429.
pub const DEFAULT_WEBHOOK_RPS: u32 = 200;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub uploads_dir: String,
    pub public_base_url: String,
    pub line_api_base: String,
    pub line_data_api_base: String,
    pub provider_timeout: Duration,
    pub token_ttl_hours: i64,
    pub webhook_rps: u32,
    pub bootstrap_owner: Option<(String, String)>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
            public_base_url: get_env("PUBLIC_BASE_URL")?,
            line_api_base: get_env_or("LINE_API_BASE", DEFAULT_LINE_API_BASE),
            line_data_api_base: get_env_or("LINE_DATA_API_BASE", DEFAULT_LINE_DATA_API_BASE),
            provider_timeout: Duration::from_secs(get_env_parse_or("PROVIDER_TIMEOUT_SECS", 10)?),
            token_ttl_hours: get_env_parse_or("TOKEN_TTL_HOURS", 12)?,
            webhook_rps: get_env_parse_or("WEBHOOK_RPS", DEFAULT_WEBHOOK_RPS)?,
            bootstrap_owner: match (
                env::var("BOOTSTRAP_OWNER_USERNAME"),
                env::var("BOOTSTRAP_OWNER_PASSWORD"),
            ) {
                (Ok(username), Ok(password)) => Some((username, password)),
                _ => None,
            },
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
