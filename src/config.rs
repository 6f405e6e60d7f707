use std::{net::SocketAddr, path::PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_MODEL_PATH: &str = "xgb_model.json";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub model_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// Log every encoded vector at info level
    pub log_predictions: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            log_predictions: false,
        }
    }
}

impl ServiceConfig {
    /// Reads `MODEL_PATH`, `BIND_ADDR`, `PORT` and `LOG_PRED`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(p) = get("MODEL_PATH") {
            cfg.model_path = PathBuf::from(p);
        }

        if let Some(addr) = get("BIND_ADDR") {
            cfg.bind_addr = addr.parse().map_err(|_| ConfigError::Invalid {
                var: "BIND_ADDR",
                value: addr.clone(),
            })?;
        } else if let Some(port) = get("PORT") {
            let port: u16 = port.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: port.clone(),
            })?;
            cfg.bind_addr.set_port(port);
        }

        cfg.log_predictions = get("LOG_PRED").as_deref() == Some("1");
        Ok(cfg)
    }
}
