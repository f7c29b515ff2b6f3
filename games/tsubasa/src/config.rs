use anyhow::Result;
use config::{Config, Environment, File};
use core_logic::{ConfigError, RunnerConfig};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_base_url() -> String {
    "https://api.app.ton.tsubasa-rivals.com/api".to_string()
}

fn default_lang_code() -> String {
    "en".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_tap_retry_delay_ms() -> u64 {
    2000
}

fn default_max_tap_failures() -> u32 {
    3
}

fn default_recovery_delay_ms() -> u64 {
    1000
}

fn default_cooldown_wait_secs() -> u64 {
    60
}

fn default_start_cooldown_retries() -> u32 {
    5
}

fn default_max_card_scans() -> u32 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_lang_code")]
    pub lang_code: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            lang_code: default_lang_code(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Optional purchase loops. Everything is off unless asked for.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureToggles {
    #[serde(default)]
    pub card_upgrades: bool,
    #[serde(default)]
    pub tap_upgrades: bool,
    #[serde(default)]
    pub energy_upgrades: bool,
}

/// Spending limits shared by the stat and card schedulers. Fixed for the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpgradeBudget {
    /// Highest coin cost a single purchase may have
    #[serde(default)]
    pub max_upgrade_cost: u64,
    #[serde(default)]
    pub max_tap_level: u64,
    #[serde(default)]
    pub max_energy_level: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingConfig {
    #[serde(default = "default_tap_retry_delay_ms")]
    pub tap_retry_delay_ms: u64,
    /// Consecutive failed tap calls before the tap engine gives up
    #[serde(default = "default_max_tap_failures")]
    pub max_tap_failures: u32,
    #[serde(default = "default_recovery_delay_ms")]
    pub recovery_delay_ms: u64,
    #[serde(default = "default_cooldown_wait_secs")]
    pub cooldown_wait_secs: u64,
    #[serde(default = "default_start_cooldown_retries")]
    pub start_cooldown_retries: u32,
    #[serde(default = "default_max_card_scans")]
    pub max_card_scans: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tap_retry_delay_ms: default_tap_retry_delay_ms(),
            max_tap_failures: default_max_tap_failures(),
            recovery_delay_ms: default_recovery_delay_ms(),
            cooldown_wait_secs: default_cooldown_wait_secs(),
            start_cooldown_retries: default_start_cooldown_retries(),
            max_card_scans: default_max_card_scans(),
        }
    }
}

impl TimingConfig {
    /// Same limits, no waiting. Used by tests.
    pub fn immediate() -> Self {
        Self {
            tap_retry_delay_ms: 0,
            recovery_delay_ms: 0,
            cooldown_wait_secs: 0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TsubasaConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub features: FeatureToggles,
    #[serde(default)]
    pub budget: UpgradeBudget,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl TsubasaConfig {
    /// Reads the TOML file at `path`, then lets `TSUBASA__SECTION__KEY`
    /// environment variables override it.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("TSUBASA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))
    }

    pub fn exists(path: &str) -> bool {
        Path::new(path).exists()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.api.base_url).map_err(|_| ConfigError::InvalidUrl {
            url: self.api.base_url.clone(),
        })?;

        if self.timing.max_tap_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timing.max_tap_failures".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        self.runner.validate()
    }

    /// Asks for feature toggles and budgets on the terminal, keeping the rest.
    pub fn prompt_settings(mut self) -> Result<Self> {
        let theme = ColorfulTheme::default();
        println!("Please configure the following settings:");

        self.features.card_upgrades = Confirm::with_theme(&theme)
            .with_prompt("Enable card upgrades?")
            .default(self.features.card_upgrades)
            .interact()?;
        self.features.tap_upgrades = Confirm::with_theme(&theme)
            .with_prompt("Enable tap upgrades?")
            .default(self.features.tap_upgrades)
            .interact()?;
        self.features.energy_upgrades = Confirm::with_theme(&theme)
            .with_prompt("Enable energy upgrades?")
            .default(self.features.energy_upgrades)
            .interact()?;

        self.budget.max_upgrade_cost = Input::with_theme(&theme)
            .with_prompt("Maximum upgrade cost")
            .default(self.budget.max_upgrade_cost)
            .interact_text()?;
        self.budget.max_tap_level = Input::with_theme(&theme)
            .with_prompt("Maximum tap upgrade level")
            .default(self.budget.max_tap_level)
            .interact_text()?;
        self.budget.max_energy_level = Input::with_theme(&theme)
            .with_prompt("Maximum energy upgrade level")
            .default(self.budget.max_energy_level)
            .interact_text()?;

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TsubasaConfig::default();
        assert_eq!(config.api.lang_code, "en");
        assert_eq!(config.timing.max_tap_failures, 3);
        assert_eq!(config.timing.tap_retry_delay_ms, 2000);
        assert!(!config.features.card_upgrades);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = std::env::temp_dir().join(format!("tsubasa-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[features]\ncard_upgrades = true\n\n[budget]\nmax_upgrade_cost = 6000\nmax_tap_level = 10\n"
        )
        .unwrap();

        let config = TsubasaConfig::load(path.to_str().unwrap()).unwrap();
        assert!(config.features.card_upgrades);
        assert!(!config.features.energy_upgrades);
        assert_eq!(config.budget.max_upgrade_cost, 6000);
        assert_eq!(config.budget.max_energy_level, 0);
        assert_eq!(config.timing.cooldown_wait_secs, 60);
        assert_eq!(config.runner.credentials_file, "data.txt");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = TsubasaConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let mut config = TsubasaConfig::default();
        config.timing.max_tap_failures = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_immediate_timing_keeps_limits() {
        let timing = TimingConfig::immediate();
        assert_eq!(timing.tap_retry_delay_ms, 0);
        assert_eq!(timing.cooldown_wait_secs, 0);
        assert_eq!(timing.max_tap_failures, 3);
        assert_eq!(timing.max_card_scans, 500);
    }
}
