use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_port() -> u16 {
    23
}

/// Operating system family of a managed device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    #[default]
    CiscoIos,
    CiscoIosXe,
    CiscoNxos,
    Generic,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceType::CiscoIos => "cisco_ios",
            DeviceType::CiscoIosXe => "cisco_ios_xe",
            DeviceType::CiscoNxos => "cisco_nxos",
            DeviceType::Generic => "generic",
        };
        f.write_str(name)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A device the search may open a session to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub name: String,
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub device_type: DeviceType,
    #[serde(flatten)]
    pub credentials: Credentials,
    /// Privileged-mode secret, sent after login when present.
    #[serde(default)]
    pub secret: Option<String>,
}

impl fmt::Debug for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceDescriptor")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("port", &self.port)
            .field("device_type", &self.device_type)
            .field("credentials", &self.credentials)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DeviceDescriptor {
    pub fn new(name: &str, address: &str, username: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            port: default_port(),
            device_type: DeviceType::default(),
            credentials: Credentials {
                username: username.to_string(),
                password: password.to_string(),
            },
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = Some(secret.to_string());
        self
    }
}

/// The ordered set of devices a search walks.
///
/// Position in the registry is probe priority for IP→MAC resolution and the
/// tie-break between equally scored port sightings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRegistry {
    devices: Vec<DeviceDescriptor>,
}

impl DeviceRegistry {
    pub fn new(devices: Vec<DeviceDescriptor>) -> Result<Self, ConfigError> {
        if devices.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for device in &devices {
            if device.address.trim().is_empty() {
                return Err(ConfigError::MissingAddress(device.name.clone()));
            }
            if !seen.insert(device.name.as_str()) {
                return Err(ConfigError::DuplicateDevice(device.name.clone()));
            }
        }

        Ok(Self { devices })
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices.iter()
    }

    pub fn get(&self, index: usize) -> Option<&DeviceDescriptor> {
        self.devices.get(index)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
