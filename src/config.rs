//! Runtime configuration from environment variables (and `.env`).

use std::env;

use crate::dispatch::{DispatchConfig, WorkerMode, DEFAULT_QUEUE_CAPACITY};
use crate::tax::GstRate;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
    pub dispatch: DispatchConfig,
    pub gst_rate: GstRate,
    pub supplier_gstin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            dispatch: DispatchConfig::default(),
            gst_rate: GstRate::default(),
            supplier_gstin: None,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset and blank keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_level = get("FARE_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let queue_capacity = match get("FARE_WORKER_QUEUE") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| ConfigError::Invalid {
                key: "FARE_WORKER_QUEUE",
                message: e.to_string(),
            })?,
            None => DEFAULT_QUEUE_CAPACITY,
        };

        let worker_mode = match get("FARE_WORKER_MODE") {
            Some(raw) => raw
                .parse::<WorkerMode>()
                .map_err(|message| ConfigError::Invalid {
                    key: "FARE_WORKER_MODE",
                    message,
                })?,
            None => WorkerMode::default(),
        };

        let gst_rate = match get("FARE_GST_RATE") {
            Some(raw) => raw.parse::<GstRate>().map_err(|e| ConfigError::Invalid {
                key: "FARE_GST_RATE",
                message: e.to_string(),
            })?,
            None => GstRate::default(),
        };

        let supplier_gstin = get("FARE_SUPPLIER_GSTIN").map(|v| v.trim().to_string());

        Ok(Self {
            log_level,
            dispatch: DispatchConfig {
                queue_capacity,
                worker_mode,
            },
            gst_rate,
            supplier_gstin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_reads_all_keys() {
        let config = Config::from_lookup(lookup(&[
            ("FARE_LOG_LEVEL", "debug"),
            ("FARE_WORKER_QUEUE", "16"),
            ("FARE_WORKER_MODE", "concurrent"),
            ("FARE_GST_RATE", "12"),
            ("FARE_SUPPLIER_GSTIN", " 33AAACT1234F1Z5 "),
        ]))
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.dispatch.queue_capacity, 16);
        assert_eq!(config.dispatch.worker_mode, WorkerMode::Concurrent);
        assert_eq!(config.gst_rate, GstRate::Twelve);
        assert_eq!(config.supplier_gstin.as_deref(), Some("33AAACT1234F1Z5"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = Config::from_lookup(lookup(&[("FARE_SUPPLIER_GSTIN", "  ")])).unwrap();
        assert!(config.supplier_gstin.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_lookup(lookup(&[("FARE_GST_RATE", "18")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FARE_GST_RATE", .. }));

        let err = Config::from_lookup(lookup(&[("FARE_WORKER_QUEUE", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FARE_WORKER_QUEUE", .. }));

        let err = Config::from_lookup(lookup(&[("FARE_WORKER_MODE", "threads")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FARE_WORKER_MODE", .. }));
    }
}
