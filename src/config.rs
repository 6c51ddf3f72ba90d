use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::system::platform::DEFAULT_VOLUME;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sampler: SamplerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: Ipv4Addr,
    pub port: u16,
    pub backlog: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: Ipv4Addr::UNSPECIFIED,
            port: 5000,
            backlog: 3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub disk_volume: String,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            disk_volume: DEFAULT_VOLUME.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hoststream").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.server.bind_address, Ipv4Addr::UNSPECIFIED);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.backlog, 3);
        assert_eq!(config.sampler.disk_volume, DEFAULT_VOLUME);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[server]
port = 6000
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 6000);
        // Other fields should be defaults
        assert_eq!(config.server.backlog, 3);
        assert_eq!(config.sampler.disk_volume, DEFAULT_VOLUME);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[server]
bind_address = "127.0.0.1"
port = 5050
backlog = 8

[sampler]
disk_volume = "/home"

[logging]
level = "debug"
format = "json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_address, Ipv4Addr::LOCALHOST);
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.server.backlog, 8);
        assert_eq!(config.sampler.disk_volume, "/home");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("hoststream_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.server.port, 5000);
        let _ = std::fs::remove_file(&temp);
    }

    #[test]
    fn invalid_bind_address_returns_default() {
        let config: Config =
            toml::from_str("[server]\nbind_address = \"not-an-ip\"\n").unwrap_or_default();
        assert_eq!(config.server.bind_address, Ipv4Addr::UNSPECIFIED);
    }
}
