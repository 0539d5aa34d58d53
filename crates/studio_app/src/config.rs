//! Startup configuration.
//!
//! Everything is read from the environment once at startup. A `.env` file in
//! the working directory is honoured for local development.

use std::time::Duration;

use log::LevelFilter;
use studio_engine::EngineSettings;
use studio_logging::LogDestination;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineSettings,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = EngineSettings::default();

        let base_url = lookup("STUDIO_API_URL").unwrap_or(defaults.base_url);
        let registry_interval = millis(&lookup, "STUDIO_REGISTRY_INTERVAL_MS")?
            .unwrap_or(defaults.registry_interval);
        let job_poll_interval = millis(&lookup, "STUDIO_JOB_POLL_INTERVAL_MS")?
            .unwrap_or(defaults.job_poll_interval);
        let job_poll_retry_limit = match lookup("STUDIO_JOB_POLL_RETRIES") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("STUDIO_JOB_POLL_RETRIES".to_string(), e.to_string())
            })?,
            None => defaults.job_poll_retry_limit,
        };
        let request_timeout =
            millis(&lookup, "STUDIO_REQUEST_TIMEOUT_MS")?.or(defaults.request_timeout);

        let log_destination = match lookup("STUDIO_LOG") {
            Some(raw) => LogDestination::parse(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "STUDIO_LOG".to_string(),
                    format!("'{raw}' is not one of terminal, file, both"),
                )
            })?,
            None => LogDestination::Terminal,
        };

        let level_str = lookup("STUDIO_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_level = level_str.parse::<LevelFilter>().map_err(|_| {
            ConfigError::InvalidValue(
                "STUDIO_LOG_LEVEL".to_string(),
                format!("'{level_str}' is not a valid log level"),
            )
        })?;

        Ok(Self {
            engine: EngineSettings {
                base_url,
                registry_interval,
                job_poll_interval,
                job_poll_retry_limit,
                request_timeout,
                ..defaults
            },
            log_destination,
            log_level,
        })
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
        Err(e) => Err(ConfigError::InvalidValue(key.to_string(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_engine_settings() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.engine.base_url, "http://localhost:3000");
        assert_eq!(config.engine.registry_interval, Duration::from_secs(5));
        assert_eq!(config.engine.job_poll_interval, Duration::from_secs(5));
        assert_eq!(config.engine.job_poll_retry_limit, 0);
        assert_eq!(config.engine.request_timeout, None);
        assert_eq!(config.log_destination, LogDestination::Terminal);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("STUDIO_API_URL", "http://studio.internal:8080"),
            ("STUDIO_REGISTRY_INTERVAL_MS", "250"),
            ("STUDIO_JOB_POLL_RETRIES", "3"),
            ("STUDIO_REQUEST_TIMEOUT_MS", "1500"),
            ("STUDIO_LOG", "both"),
            ("STUDIO_LOG_LEVEL", "debug"),
        ])
        .unwrap();
        assert_eq!(config.engine.base_url, "http://studio.internal:8080");
        assert_eq!(config.engine.registry_interval, Duration::from_millis(250));
        assert_eq!(config.engine.job_poll_retry_limit, 3);
        assert_eq!(
            config.engine.request_timeout,
            Some(Duration::from_millis(1500))
        );
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = config_from(&[("STUDIO_JOB_POLL_INTERVAL_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "STUDIO_JOB_POLL_INTERVAL_MS"));

        let err = config_from(&[("STUDIO_REGISTRY_INTERVAL_MS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "STUDIO_REGISTRY_INTERVAL_MS"));

        let err = config_from(&[("STUDIO_LOG", "syslog")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "STUDIO_LOG"));
    }
}
