use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

const DEFAULT_HISTORY_FILE: &str = "hopp.db";
const DEFAULT_HISTORY_CAPACITY: usize = 5;
const DEFAULT_WINDOW_SIZE: [f32; 2] = [800.0, 600.0];

const ENV_HISTORY_FILE: &str = "ZIPHOPP_HISTORY_FILE";
const ENV_HISTORY_CAPACITY: &str = "ZIPHOPP_HISTORY_CAPACITY";
const ENV_LIGHT_MODE: &str = "ZIPHOPP_LIGHT_MODE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub history_file: PathBuf,
    pub history_capacity: usize,
    pub window_size: [f32; 2],
    pub dark_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            window_size: DEFAULT_WINDOW_SIZE,
            dark_mode: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from defaults overridden by whatever `lookup` returns.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(file) = lookup(ENV_HISTORY_FILE).filter(|v| !v.trim().is_empty()) {
            config.history_file = PathBuf::from(file);
        }

        if let Some(value) = lookup(ENV_HISTORY_CAPACITY) {
            config.history_capacity = match value.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_HISTORY_CAPACITY,
                        value,
                        message: "must be at least 1".to_string(),
                    })
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_HISTORY_CAPACITY,
                        value,
                        message: e.to_string(),
                    })
                }
            };
        }

        if let Some(value) = lookup(ENV_LIGHT_MODE) {
            config.dark_mode = !parse_flag(ENV_LIGHT_MODE, &value)?;
        }

        Ok(config)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            message: "expected true or false".to_string(),
        }),
    }
}
