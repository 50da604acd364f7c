use crate::error::{Error, Result};
use crate::loader::LoaderConfig;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub loader_wait_ms: u64,
    /// Zero, the default, disables the cap.
    pub loader_max_batch: usize,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            loader_wait_ms: get_env_parse_or("LOADER_WAIT_MS", 1)?,
            loader_max_batch: get_env_parse_or("LOADER_MAX_BATCH", 0)?,
        })
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            wait: Duration::from_millis(self.loader_wait_ms),
            max_batch: (self.loader_max_batch > 0).then_some(self.loader_max_batch),
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
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

#[cfg(test)]
mod tests {
    use super::*;

    fn config(wait_ms: u64, max_batch: usize) -> Config {
        Config {
            server_address: "127.0.0.1:0".into(),
            database_url: "postgres://localhost/quiz_log".into(),
            database_max_connections: 10,
            loader_wait_ms: wait_ms,
            loader_max_batch: max_batch,
        }
    }

    #[test]
    fn loader_config_from_settings() {
        let lc = config(5, 20).loader_config();
        assert_eq!(lc.wait, Duration::from_millis(5));
        assert_eq!(lc.max_batch, Some(20));
    }

    #[test]
    fn zero_max_batch_is_unbounded() {
        assert_eq!(config(1, 0).loader_config().max_batch, None);
    }
}
