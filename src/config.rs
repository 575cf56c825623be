use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::error::RelayError;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Environment configuration.
///
/// The three credentials are optional here so a missing one can be reported
/// per invocation instead of failing at load time.
#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub request_token: Option<String>,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// Credentials that passed the configuration gate.
#[derive(Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
    pub request_token: String,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid environment configuration: {}", e))?;
        Ok(config)
    }

    /// Empty values count as missing.
    pub fn credentials(&self) -> Result<Credentials, RelayError> {
        match (
            non_empty(&self.bot_token),
            non_empty(&self.chat_id),
            non_empty(&self.request_token),
        ) {
            (Some(bot_token), Some(chat_id), Some(request_token)) => Ok(Credentials {
                bot_token,
                chat_id,
                request_token,
            }),
            _ => Err(RelayError::Configuration),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            request_token: None,
            server_port: DEFAULT_SERVER_PORT,
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}
