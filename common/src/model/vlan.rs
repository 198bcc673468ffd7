use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VlanParseError;

/// An 802.1Q VLAN id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    pub const MAX: u16 = 4094;

    pub fn new(id: u16) -> Result<Self, VlanParseError> {
        if (1..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(VlanParseError::OutOfRange(id.to_string()))
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl FromStr for VlanId {
    type Err = VlanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u16 = s
            .trim()
            .parse()
            .map_err(|_| VlanParseError::OutOfRange(s.to_string()))?;
        Self::new(id)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = VlanParseError;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(vlan: VlanId) -> Self {
        vlan.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
