//! Port characterization: is this port an uplink or an edge port?
//!
//! Three independent signals are read from the device. Each is best effort:
//! a signal the device does not answer leaves its field unset and never
//! prevents the others from being collected. Only when every command fails
//! is the port reported as not characterized.

use switchtrace_common::config::Config;
use switchtrace_common::model::{InterfaceName, PortCharacterization};
use switchtrace_protocols::rows;

use crate::session::{self, Attempt, DeviceSession};

fn switchport_command(interface: &InterfaceName) -> String {
    format!("show interfaces {interface} switchport")
}

fn neighbor_commands(interface: &InterfaceName) -> [(String, fn(&str) -> bool); 2] {
    [
        (
            format!("show cdp neighbors interface {interface} detail"),
            rows::cdp_neighbor_present,
        ),
        (
            format!("show lldp neighbors interface {interface} detail"),
            rows::lldp_neighbor_present,
        ),
    ]
}

fn address_table_command(interface: &InterfaceName) -> String {
    format!("show mac address-table interface {interface}")
}

pub async fn characterize(
    session: &mut dyn DeviceSession,
    device: &str,
    interface: &InterfaceName,
    config: &Config,
) -> Option<PortCharacterization> {
    let budget = config.characterize_timeout;
    let mut data = PortCharacterization::default();
    let mut answered = false;

    let switchport = session::run(session, device, &switchport_command(interface), budget).await;
    answered |= !matches!(switchport, Attempt::Failed(_));
    if let Attempt::Found(output) = switchport {
        let mode = rows::switchport_mode(&output);
        data.is_trunk = mode.is_trunk;
        data.is_access = mode.is_access;
        data.access_vlan = mode.access_vlan;
        data.native_vlan = mode.native_vlan;
    }

    for (command, detects_neighbor) in neighbor_commands(interface) {
        let neighbors = session::run(session, device, &command, budget).await;
        answered |= !matches!(neighbors, Attempt::Failed(_));
        if let Attempt::Found(output) = neighbors {
            data.has_neighbor |= detects_neighbor(&output);
        }
    }

    let table = session::run(session, device, &address_table_command(interface), budget).await;
    answered |= !matches!(table, Attempt::Failed(_));
    if let Attempt::Found(output) = table {
        data.mac_count = Some(rows::learned_address_count(&output));
    }

    answered.then_some(data)
}
