use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::sender::{ReadMode, DEFAULT_BUFFER_SIZE, DEFAULT_HOST, DEFAULT_PORT};

pub const DEFAULT_CONFIG_FILE: &str = "config/config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub buffer_size: usize,
    pub read_mode: ReadMode,
    /// 0 means block on connect.
    pub connect_timeout_ms: u64,
    pub log_level: String,
    pub log_to_file: bool,
    pub log_file: String,
}

impl AppConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_ms > 0).then(|| Duration::from_millis(self.connect_timeout_ms))
    }
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("buffer_size", DEFAULT_BUFFER_SIZE as i64)?
        .set_default("read_mode", "single")?
        .set_default("connect_timeout_ms", 0_i64)?
        .set_default("log_level", "info")?
        .set_default("log_to_file", false)?
        .set_default("log_file", "log/send_messages.log")
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(DEFAULT_CONFIG_FILE)
}

/// Defaults, then `path` if it exists, then `APP_*` environment variables.
pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    let s = with_defaults()?
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix("APP"))
        .build()?;

    let config: AppConfig = s.try_deserialize()?;
    if config.buffer_size == 0 {
        return Err(ConfigError::Message(
            "buffer_size must be greater than 0".to_string(),
        ));
    }
    Ok(config)
}
