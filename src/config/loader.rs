//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::{ApiCredentials, AppConfig};
use crate::common::errors::{EngineError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_)
/// 2. Configuration file (TOML format)
/// 3. Default values
///
/// `ALPACA_API_KEY` / `ALPACA_SECRET_KEY` are appended as a final credential
/// when present.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| EngineError::Configuration(e.to_string()))?;

    let mut app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| EngineError::Configuration(e.to_string()))?;

    if let Some(creds) = credentials_from_env() {
        if !app_config.alpaca.credentials.contains(&creds) {
            app_config.alpaca.credentials.push(creds);
        }
    }

    validate(&app_config)?;
    Ok(app_config)
}

fn credentials_from_env() -> Option<ApiCredentials> {
    match (std::env::var("ALPACA_API_KEY"), std::env::var("ALPACA_SECRET_KEY")) {
        (Ok(key), Ok(secret)) if !key.is_empty() && !secret.is_empty() => {
            Some(ApiCredentials::new(key, secret))
        }
        _ => None,
    }
}

/// Reject configurations that cannot drive a pass
pub fn validate(config: &AppConfig) -> Result<()> {
    config
        .sessions
        .timezone
        .parse::<chrono_tz::Tz>()
        .map_err(|e| EngineError::Configuration(format!("invalid timezone: {}", e)))?;

    for window in &config.sessions.windows {
        if window.start > window.end {
            return Err(EngineError::Configuration(format!(
                "session window '{}' starts after it ends",
                window.name
            )));
        }
    }

    if config.alpaca.retry.max_attempts == 0 {
        return Err(EngineError::Configuration(
            "alpaca.retry.max_attempts must be at least 1".to_string(),
        ));
    }

    if let Some(capital) = config.settings.capital {
        if capital.is_sign_negative() {
            return Err(EngineError::Configuration(format!(
                "capital must not be negative, got {}",
                capital
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let mut config = AppConfig::default();
        config.sessions.timezone = "Mars/Olympus".to_string();
        assert!(matches!(validate(&config), Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let mut config = AppConfig::default();
        config.sessions.windows[0].start = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        config.sessions.windows[0].end = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_negative_capital_rejected() {
        let mut config = AppConfig::default();
        config.settings.capital = Some(dec!(-5));
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trader.toml");
        std::fs::write(
            &path,
            r#"
[settings]
capital = 2500

[sessions]
timezone = "America/Chicago"
allow_pre_market = false

[[sessions.windows]]
name = "open"
state = "regular"
start = "08:30:00"
end = "08:45:00"
batch = "data/open.csv"
"#,
        )
        .unwrap();

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.settings.capital, Some(dec!(2500)));
        assert_eq!(config.sessions.timezone, "America/Chicago");
        assert!(!config.sessions.allow_pre_market);
        assert_eq!(config.sessions.windows.len(), 1);
        assert_eq!(config.sessions.windows[0].name, "open");
        assert_eq!(config.alpaca.trading_url, "https://paper-api.alpaca.markets");
    }
}
