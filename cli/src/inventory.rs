//! YAML device inventory.
//!
//! ```yaml
//! settings:
//!   vlan_of_interest: 10
//!   physical_port_limit: 48
//! devices:
//!   - name: core-1
//!     address: 10.0.0.1
//!     username: netops
//!     password: hunter2
//!     secret: enable-secret
//!   - name: access-3f
//!     address: 10.0.0.13
//!     port: 2323
//!     device_type: cisco_ios_xe
//!     username: netops
//!     password: hunter2
//! ```
//!
//! Device order matters: it is the order devices are asked for the IP→MAC
//! binding and the tie-break between equally ranked ports.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use switchtrace_common::error::ConfigError;
use switchtrace_common::model::{DeviceDescriptor, DeviceRegistry, VlanId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("cannot read inventory {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("inventory is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("inventory rejected: {0}")]
    Invalid(#[from] ConfigError),
}

/// Optional defaults for a search. Command line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub vlan_of_interest: Option<VlanId>,
    pub physical_port_limit: Option<u32>,
    /// Seconds.
    pub command_timeout: Option<u64>,
    pub parallel: Option<usize>,
    pub prime_arp: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub settings: Settings,
    pub devices: Vec<DeviceDescriptor>,
}

impl Inventory {
    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        let text = fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, InventoryError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Splits the inventory into its settings and a validated registry.
    pub fn into_parts(self) -> Result<(Settings, DeviceRegistry), InventoryError> {
        let registry = DeviceRegistry::new(self.devices)?;
        Ok((self.settings, registry))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use switchtrace_common::model::DeviceType;

    const SAMPLE: &str = "\
settings:
  vlan_of_interest: 10
devices:
  - name: core-1
    address: 10.0.0.1
    username: netops
    password: hunter2
    secret: en
  - name: access-3f
    address: 10.0.0.13
    port: 2323
    device_type: cisco_ios_xe
    username: netops
    password: hunter2
";

    #[test]
    fn loads_devices_in_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let (settings, registry) = Inventory::load(file.path()).unwrap().into_parts().unwrap();

        assert_eq!(settings.vlan_of_interest, Some(VlanId::new(10).unwrap()));
        let names: Vec<&str> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["core-1", "access-3f"]);

        let core = registry.get(0).unwrap();
        assert_eq!(core.port, 23);
        assert_eq!(core.device_type, DeviceType::CiscoIos);
        assert_eq!(core.secret.as_deref(), Some("en"));

        let access = registry.get(1).unwrap();
        assert_eq!(access.port, 2323);
        assert_eq!(access.device_type, DeviceType::CiscoIosXe);
        assert_eq!(access.credentials.username, "netops");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Inventory::load(&dir.path().join("nope.yaml"));
        assert!(matches!(result, Err(InventoryError::Read { .. })));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let text = "\
devices:
  - { name: sw, address: 10.0.0.1, username: u, password: p }
  - { name: sw, address: 10.0.0.2, username: u, password: p }
";
        let result = Inventory::parse(text).unwrap().into_parts();
        assert!(matches!(
            result,
            Err(InventoryError::Invalid(ConfigError::DuplicateDevice(_)))
        ));
    }

    #[test]
    fn bad_settings_do_not_parse() {
        assert!(matches!(
            Inventory::parse("settings: { vlan_of_interest: 5000 }\ndevices: []"),
            Err(InventoryError::Parse(_))
        ));
        assert!(matches!(
            Inventory::parse("settings: { colour: blue }\ndevices: []"),
            Err(InventoryError::Parse(_))
        ));
    }
}
