use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

fn default_account_delay_ms() -> u64 {
    1000
}

fn default_pass_delay_secs() -> u64 {
    60
}

fn default_credentials_file() -> String {
    "data.txt".to_string()
}

fn default_proxies_file() -> String {
    "proxies.txt".to_string()
}

/// Scheduling of the roster loop: which accounts, and how long to wait between them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Pause after each account turn
    #[serde(default = "default_account_delay_ms")]
    pub account_delay_ms: u64,
    /// Countdown between two full passes over the roster
    #[serde(default = "default_pass_delay_secs")]
    pub pass_delay_secs: u64,
    /// Newline-delimited credential file
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
    /// Optional proxy list, `ip:port[:user:pass]` per line
    #[serde(default = "default_proxies_file")]
    pub proxies_file: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            account_delay_ms: default_account_delay_ms(),
            pass_delay_secs: default_pass_delay_secs(),
            credentials_file: default_credentials_file(),
            proxies_file: default_proxies_file(),
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials_file.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "runner.credentials_file".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}
