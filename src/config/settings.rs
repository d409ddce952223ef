//! Server settings read from the process environment.

use std::env;
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};

/// Default configuration directory.
pub const DEFAULT_CONFIG_DIR: &str = "./config/campus";
/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default bind port.
pub const DEFAULT_PORT: u16 = 8080;

/// Settings for the HTTP server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Directory holding the campus YAML files (`ERP_CONFIG_DIR`).
    pub config_dir: PathBuf,
    /// Host to bind (`API_HOST`).
    pub api_host: String,
    /// Port to bind (`API_PORT`).
    pub api_port: u16,
}

impl ServerSettings {
    /// Reads settings from the environment, falling back to defaults.
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset
    /// or empty variables.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `API_PORT` is not a valid port number.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_port = match read("API_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                EngineError::invalid_input("API_PORT", format!("invalid port '{}': {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            config_dir: read("ERP_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            api_host: read("API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            api_port,
        })
    }

    /// Returns the `host:port` address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> EngineResult<ServerSettings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = settings(&[]).unwrap();

        assert_eq!(settings.config_dir, PathBuf::from("./config/campus"));
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides_from_environment() {
        let settings = settings(&[
            ("ERP_CONFIG_DIR", "/etc/erp"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9090"),
        ])
        .unwrap();

        assert_eq!(settings.config_dir, PathBuf::from("/etc/erp"));
        assert_eq!(settings.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let settings = settings(&[("API_HOST", " "), ("API_PORT", "")]).unwrap();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        match settings(&[("API_PORT", "eighty")]) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "API_PORT"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }
}
