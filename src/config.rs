//! Agent configuration, read once at start-up from a TOML file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Optional LED brightness attribute driven once the link is up
    #[serde(default)]
    pub status_led: Option<PathBuf>,
    pub broker: BrokerConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub link: LinkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_client_id")]
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub driver: SensorDriver,
    pub device: PathBuf,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            driver: SensorDriver::Iio,
            device: PathBuf::from("/sys/bus/iio/devices/iio:device0"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorDriver {
    Iio,
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Address probed to decide whether the network link is up
    pub probe_addr: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            probe_addr: "1.1.1.1:53".to_string(),
        }
    }
}

fn default_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "roomsense".to_string()
}

impl Config {
    /// Get the default config file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roomsense").join("config.toml"))
    }

    /// Load config from file. The agent cannot run without broker
    /// details, so a missing or unparseable file is a start-up error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_config_parses() {
        let config: Config = toml::from_str(include_str!("../config.toml.example")).unwrap();
        assert_eq!(config.broker.host, "broker.example.org");
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.broker.username.as_deref(), Some("roomsense"));
        assert_eq!(config.broker.client_id, "roomsense");
        assert_eq!(config.sensor.driver, SensorDriver::Iio);
        assert!(config.status_led.is_none());
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config: Config = toml::from_str("[broker]\nhost = \"mqtt.local\"").unwrap();
        assert_eq!(config.broker.port, 1883);
        assert!(config.broker.username.is_none());
        assert!(config.broker.password.is_none());
        assert_eq!(config.link.probe_addr, "1.1.1.1:53");
        assert_eq!(
            config.sensor.device,
            PathBuf::from("/sys/bus/iio/devices/iio:device0")
        );
    }

    #[test]
    fn driver_selection_round_trips() {
        let config: Config =
            toml::from_str("[broker]\nhost = \"mqtt.local\"\n[sensor]\ndriver = \"simulated\"")
                .unwrap();
        assert_eq!(config.sensor.driver, SensorDriver::Simulated);

        let rendered = toml::to_string(&config).unwrap();
        let reparsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed.sensor.driver, SensorDriver::Simulated);
    }

    #[test]
    fn missing_file_is_a_startup_error() {
        assert!(Config::load(Path::new("/nonexistent/roomsense.toml")).is_err());
    }
}
