use std::fmt;
use std::net::IpAddr;

use super::{InterfaceName, IpMacResolution, MacAddress, ResolutionSource, VlanId};

/// Signals gathered about one switch port. Every field is best effort; an
/// unset field means the device did not answer, not that the answer is "no".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortCharacterization {
    pub is_trunk: bool,
    pub is_access: bool,
    pub access_vlan: Option<VlanId>,
    pub native_vlan: Option<VlanId>,
    /// Approximate number of dynamically learned addresses on the port.
    pub mac_count: Option<u32>,
    pub has_neighbor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// The sighting was accepted and the port characterized.
    Dynamic,
    /// A physical port was seen but the row could not be fully trusted.
    Unknown,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Dynamic => f.write_str("DYNAMIC"),
            Confidence::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

/// One device's sighting of the target MAC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCandidate {
    pub device: String,
    /// Position of `device` in the registry; the stable tie-break key.
    pub registry_index: usize,
    pub interface: InterfaceName,
    pub vlan_id: Option<VlanId>,
    pub characterization: PortCharacterization,
    pub confidence: Confidence,
    pub score: i32,
}

/// Where the host was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationResult {
    pub device: String,
    pub interface: InterfaceName,
    pub ip: IpAddr,
    pub mac: MacAddress,
    pub vlan: Option<VlanId>,
    pub characterization: PortCharacterization,
    pub confidence: Confidence,
    pub score: i32,
    /// Stage-one source that produced the MAC.
    pub source: ResolutionSource,
    pub vendor: Option<String>,
}

impl LocationResult {
    /// Builds the final answer from the winning sighting. The reported VLAN is
    /// the sighting's VLAN, then the port's access VLAN, then the VLAN hint
    /// from the IP→MAC lookup.
    pub fn from_candidate(candidate: PortCandidate, resolution: &IpMacResolution) -> Self {
        let vlan = candidate
            .vlan_id
            .or(candidate.characterization.access_vlan)
            .or(resolution.vlan_id);

        Self {
            device: candidate.device,
            interface: candidate.interface,
            ip: resolution.ip,
            mac: resolution.mac,
            vlan,
            characterization: candidate.characterization,
            confidence: candidate.confidence,
            score: candidate.score,
            source: resolution.source,
            vendor: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// IP→MAC resolution.
    Resolve,
    /// MAC→port location.
    Locate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Resolve => f.write_str("ip→mac"),
            Stage::Locate => f.write_str("mac→port"),
        }
    }
}

/// A device that contributed nothing because its session could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFailure {
    pub device: String,
    pub stage: Stage,
    pub reason: String,
}

/// Terminal result of a search. Total failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateOutcome {
    Located {
        result: LocationResult,
        failures: Vec<DeviceFailure>,
    },
    /// No device could map the IP to a MAC.
    MacUnresolved {
        ip: IpAddr,
        failures: Vec<DeviceFailure>,
    },
    /// The MAC was resolved but no device has it in its MAC table.
    MacNotInTables {
        resolution: IpMacResolution,
        failures: Vec<DeviceFailure>,
    },
}

impl LocateOutcome {
    pub fn failures(&self) -> &[DeviceFailure] {
        match self {
            LocateOutcome::Located { failures, .. }
            | LocateOutcome::MacUnresolved { failures, .. }
            | LocateOutcome::MacNotInTables { failures, .. } => failures,
        }
    }

    pub fn location(&self) -> Option<&LocationResult> {
        match self {
            LocateOutcome::Located { result, .. } => Some(result),
            _ => None,
        }
    }
}
