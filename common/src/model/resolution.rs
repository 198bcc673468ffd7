use std::fmt;
use std::net::IpAddr;

use super::{MacAddress, VlanId};

/// Where an IP→MAC binding was read from, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    /// The address is configured on the device itself (SVI, loopback, mgmt).
    LocalInterface,
    DhcpSnooping,
    /// ARP lookup for exactly the target address.
    Arp,
    /// Full ARP table, all VRFs.
    ArpScan,
    DeviceTracking,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::LocalInterface => "local-if",
            ResolutionSource::DhcpSnooping => "dhcp",
            ResolutionSource::Arp => "arp",
            ResolutionSource::ArpScan => "arp-scan",
            ResolutionSource::DeviceTracking => "device-tracking",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of a successful IP→MAC lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpMacResolution {
    pub ip: IpAddr,
    pub mac: MacAddress,
    /// Used as a hint for the MAC table lookup.
    pub vlan_id: Option<VlanId>,
    /// Raw interface token from the row the MAC was read from.
    pub interface: Option<String>,
    pub source: ResolutionSource,
    pub origin_device: String,
}
