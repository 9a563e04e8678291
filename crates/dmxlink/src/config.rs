//! Client configuration
//!
//! Loaded from TOML or JSON; every field has a default so partial files work.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::dmx::artnet::DEFAULT_PORT;
use crate::{error::ArtNetError, Result};

/// Limited broadcast address, the default destination
pub const BROADCAST_HOST: &str = "255.255.255.255";

/// Whether `host` is the limited broadcast address
pub fn is_broadcast(host: &str) -> bool {
    host == BROADCAST_HOST
}

fn default_host() -> String {
    BROADCAST_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_refresh_ms() -> u64 {
    4000
}

fn default_throttle_ms() -> u64 {
    25
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

/// ArtNet client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtNetConfig {
    /// Destination host (IP or hostname)
    #[serde(default = "default_host")]
    pub host: String,
    /// Destination UDP port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Keep-alive period: a full frame is resent after this long without a send
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
    /// Minimum gap between two sends of the same universe
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Always transmit all 512 channels instead of the changed prefix
    #[serde(default)]
    pub send_all: bool,
    /// Local interface address the UDP socket binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ArtNetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            refresh_ms: default_refresh_ms(),
            throttle_ms: default_throttle_ms(),
            send_all: false,
            bind_address: default_bind_address(),
        }
    }
}

impl ArtNetConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.toml` or `.json` file, chosen by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ArtNetError::Configuration(format!(
                "unsupported config file: {}",
                path.display()
            ))),
        }
    }

    /// Save as pretty-printed JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ArtNetConfig::default();
        assert_eq!(config.host, "255.255.255.255");
        assert_eq!(config.port, 6454);
        assert_eq!(config.refresh_interval(), Duration::from_millis(4000));
        assert_eq!(config.throttle_interval(), Duration::from_millis(25));
        assert!(!config.send_all);
        assert!(is_broadcast(&config.host));
    }

    #[test]
    fn test_partial_toml() {
        let config = ArtNetConfig::from_toml_str(
            r#"
            host = "10.0.0.20"
            send_all = true
            "#,
        )
        .unwrap();

        assert_eq!(config.host, "10.0.0.20");
        assert!(config.send_all);
        assert_eq!(config.port, 6454);
        assert_eq!(config.refresh_ms, 4000);
        assert!(!is_broadcast(&config.host));
    }

    #[test]
    fn test_partial_json() {
        let config = ArtNetConfig::from_json_str(r#"{ "refresh_ms": 1000, "port": 6455 }"#).unwrap();
        assert_eq!(config.refresh_ms, 1000);
        assert_eq!(config.port, 6455);
        assert_eq!(config.host, BROADCAST_HOST);
    }

    #[test]
    fn test_is_broadcast() {
        assert!(is_broadcast("255.255.255.255"));
        assert!(!is_broadcast("192.168.1.255"));
        assert!(!is_broadcast("10.0.0.1"));
    }

    #[test]
    fn test_invalid_toml() {
        let result = ArtNetConfig::from_toml_str("port = \"not a number\"");
        assert!(matches!(result, Err(ArtNetError::TomlError(_))));
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("artnet.toml");
        fs::write(&toml_path, "throttle_ms = 40\n").unwrap();
        let config = ArtNetConfig::load(&toml_path).unwrap();
        assert_eq!(config.throttle_ms, 40);

        let json_path = dir.path().join("artnet.json");
        config.save_json(&json_path).unwrap();
        assert_eq!(ArtNetConfig::load(&json_path).unwrap(), config);

        let other = dir.path().join("artnet.yaml");
        fs::write(&other, "").unwrap();
        assert!(matches!(
            ArtNetConfig::load(&other),
            Err(ArtNetError::Configuration(_))
        ));
    }
}
