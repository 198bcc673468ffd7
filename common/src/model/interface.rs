use std::fmt;

use serde::{Deserialize, Serialize};

/// An interface name in canonical long form, e.g. `GigabitEthernet1/0/24`.
///
/// Produced by the protocols crate's canonicalizer; this type only carries the
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterfaceName(String);

impl InterfaceName {
    pub fn from_canonical(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InterfaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortClass {
    /// An Ethernet-family port inside the access-port budget.
    PhysicalAccess,
    /// SVIs, port-channels, loopbacks, serial links.
    Logical,
    /// Entries the switch itself owns (`CPU`, `ROUTER`).
    Excluded,
    /// Anything else, including Ethernet ports past the access-port budget.
    Other,
}
