//! Startup configuration: broker connection, adapter policies and the device
//! key table.
//!
//! Read once from a TOML file. The default location is
//! `<config dir>/airmx/config.toml`.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::mqtt::config::MqttConfig;
use crate::protocol::InstantPushData;

const CONFIG_DIR: &str = "airmx";
const CONFIG_FILE: &str = "config.toml";

/// A device and its pre-shared signing key.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: u64,
    pub key: String,
}

impl Device {
    pub fn new(id: u64, key: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// What to do with an inbound message whose topic does not parse.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TopicPolicy {
    /// Log and drop it. Suits a broker shared with unrelated traffic.
    #[default]
    Ignore,
    /// Return the format error to the caller.
    Strict,
}

/// What to do once every listener has run and at least one failed.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListenerPolicy {
    #[default]
    Log,
    Propagate,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct InstantPushConfig {
    pub frequency_time: u32,
    pub duration_time: u32,
}

impl Default for InstantPushConfig {
    fn default() -> Self {
        let data = InstantPushData::default();
        Self {
            frequency_time: data.frequency_time,
            duration_time: data.duration_time,
        }
    }
}

impl From<InstantPushConfig> for InstantPushData {
    fn from(config: InstantPushConfig) -> Self {
        Self {
            frequency_time: config.frequency_time,
            duration_time: config.duration_time,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AdapterConfig {
    pub topic_policy: TopicPolicy,
    pub listener_policy: ListenerPolicy,
    pub instant_push: InstantPushConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub adapter: AdapterConfig,
    #[serde(default)]
    pub devices: Vec<Device>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push(CONFIG_DIR);
            path.push(CONFIG_FILE);
            path
        })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config = Self::from_toml(&content)?;
        info!(
            "Loaded configuration with {} device(s) from {}",
            config.devices.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| eyre!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.devices.is_empty() {
            warn!("No devices configured, every inbound message will be rejected");
        }

        let mut seen = HashSet::new();
        for device in &self.devices {
            if !seen.insert(device.id) {
                return Err(eyre!("Device {} is configured more than once", device.id));
            }
        }

        if self.mqtt.keep_alive_secs == 0 {
            return Err(eyre!("MQTT keep_alive_secs must be at least 1"));
        }

        if self.mqtt.username.is_some() != self.mqtt.password.is_some() {
            return Err(eyre!("MQTT username and password must be set together"));
        }

        Ok(())
    }
}
