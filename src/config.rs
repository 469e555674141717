use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[error("invalid value for {key}: {message}")]
pub struct ConfigError {
    key: &'static str,
    message: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub secure_cookies: bool,
    pub media_dir: String,
    /// Default page size for paginated listings.
    pub page_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/foodgram.db".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            secure_cookies: false,
            media_dir: "media".to_string(),
            page_size: 6,
        }
    }
}

impl Config {
    /// Read configuration from the process environment, falling back to
    /// defaults for unset keys. Call `dotenvy::dotenv()` first to pick up a
    /// `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let config = Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: try_load("BIND_ADDR", defaults.bind_addr)?,
            secure_cookies: try_load("SECURE_COOKIES", defaults.secure_cookies)?,
            media_dir: env::var("MEDIA_DIR").unwrap_or(defaults.media_dir),
            page_size: try_load("PAGE_SIZE", defaults.page_size)?,
        };

        if config.page_size < 1 {
            return Err(ConfigError {
                key: "PAGE_SIZE",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }
}

fn try_load<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse(key, &raw),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        message: e.to_string(),
    })
}
