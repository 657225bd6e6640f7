use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

pub const MAX_NOTIFICATION_PAGE: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub admin_rps: u32,
    pub public_rps: u32,
    pub notification_page_limit: i64,
    pub log_format: LogFormat,
    pub notification_webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store = get_env_or("STORE", StoreBackend::Postgres)?;
        let database_url = match store {
            StoreBackend::Postgres => Some(get_env("DATABASE_URL")?),
            StoreBackend::Memory => env::var("DATABASE_URL").ok(),
        };
        let notification_webhook_url = env::var("NOTIFICATION_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let webhook_secret = env::var("WEBHOOK_SECRET").ok();
        if notification_webhook_url.is_some() && webhook_secret.is_none() {
            return Err(Error::Config(
                "WEBHOOK_SECRET is required when NOTIFICATION_WEBHOOK_URL is set".to_string(),
            ));
        }

        let notification_page_limit: i64 = get_env_or("NOTIFICATION_PAGE_LIMIT", 50)?;

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            store,
            database_url,
            jwt_secret: get_env("JWT_SECRET")?,
            admin_rps: get_env_or("ADMIN_RPS", 20)?,
            public_rps: get_env_or("PUBLIC_RPS", 100)?,
            notification_page_limit: notification_page_limit.clamp(1, MAX_NOTIFICATION_PAGE),
            log_format: get_env_or("LOG_FORMAT", LogFormat::Pretty)?,
            notification_webhook_url,
            webhook_secret,
        })
    }

    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            server_address: "127.0.0.1:0".to_string(),
            store: StoreBackend::Memory,
            database_url: None,
            jwt_secret: jwt_secret.to_string(),
            admin_rps: 1_000,
            public_rps: 1_000,
            notification_page_limit: 50,
            log_format: LogFormat::Pretty,
            notification_webhook_url: None,
            webhook_secret: None,
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_accepts_aliases() {
        assert_eq!("pg".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!("Memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn log_format_parses_json() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
    }
}
