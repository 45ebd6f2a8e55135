//! Environment configuration of the CLI.

use std::ffi::OsString;
use std::path::PathBuf;

use pantheon_core::{Error, Result};

/// Program implementing the native commands.
pub const ENGINE_ENV: &str = "PANTHEON_ENGINE";
/// `EnvFilter` directives for logging.
pub const LOG_ENV: &str = "PANTHEON_LOG";
/// `human` or `json`.
pub const LOG_FORMAT_ENV: &str = "PANTHEON_LOG_FORMAT";

pub const DEFAULT_ENGINE: &str = "juicefs";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(invalid(LOG_FORMAT_ENV, raw, "expected one of: human, json")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub engine: PathBuf,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self> {
        let engine = match lookup(ENGINE_ENV) {
            None => PathBuf::from(DEFAULT_ENGINE),
            Some(value) if value.is_empty() => {
                return Err(invalid(ENGINE_ENV, "", "must not be empty"));
            }
            Some(value) => PathBuf::from(value),
        };

        let log_format = match lookup(LOG_FORMAT_ENV) {
            None => LogFormat::default(),
            Some(value) => match value.to_str() {
                Some(raw) => LogFormat::parse(raw)?,
                None => {
                    return Err(invalid(
                        LOG_FORMAT_ENV,
                        &value.to_string_lossy(),
                        "contains non-UTF-8 bytes",
                    ));
                }
            },
        };

        Ok(Self { engine, log_format })
    }
}

fn invalid(key: &str, value: &str, message: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}
