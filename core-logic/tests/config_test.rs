use core_logic::config::{ProxyConfig, RunnerConfig};
use core_logic::ConfigError;

#[test]
fn test_runner_config_defaults() {
    let config = RunnerConfig::default();

    assert_eq!(config.account_delay_ms, 1000);
    assert_eq!(config.pass_delay_secs, 60);
    assert_eq!(config.credentials_file, "data.txt");
    assert_eq!(config.proxies_file, "proxies.txt");
    assert!(config.validate().is_ok());
}

#[test]
fn test_runner_config_partial_json_uses_defaults() {
    let config: RunnerConfig = serde_json::from_str(r#"{"pass_delay_secs": 5}"#).unwrap();

    assert_eq!(config.pass_delay_secs, 5);
    assert_eq!(config.account_delay_ms, 1000);
    assert_eq!(config.credentials_file, "data.txt");
}

#[test]
fn test_runner_config_rejects_blank_credentials_file() {
    let config = RunnerConfig {
        credentials_file: "  ".to_string(),
        ..Default::default()
    };

    match config.validate() {
        Err(ConfigError::MissingField { field }) => assert_eq!(field, "runner.credentials_file"),
        other => panic!("Expected MissingField, got {:?}", other),
    }
}

#[test]
fn test_proxy_config_no_auth() {
    let proxy = ProxyConfig {
        url: "http://proxy.example.com:8080".to_string(),
        username: None,
        password: None,
    };

    assert!(proxy.username.is_none());
    assert!(proxy.password.is_none());
}
