//! # Data Model
//!
//! Values exchanged between the two resolution stages and handed to the
//! presentation layer. Apart from the registry, every value here is created
//! once by a stage and never mutated afterwards.

mod device;
mod interface;
mod location;
mod mac;
mod resolution;
mod vlan;

pub use device::{Credentials, DeviceDescriptor, DeviceRegistry, DeviceType};
pub use interface::{InterfaceName, PortClass};
pub use location::{
    Confidence, DeviceFailure, LocateOutcome, LocationResult, PortCandidate, PortCharacterization,
    Stage,
};
pub use mac::MacAddress;
pub use resolution::{IpMacResolution, ResolutionSource};
pub use vlan::VlanId;
