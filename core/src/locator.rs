//! MAC→port location on a single device.

use std::time::Duration;

use switchtrace_common::config::Config;
use switchtrace_common::model::{
    Confidence, InterfaceName, MacAddress, PortCandidate, PortCharacterization, PortClass, VlanId,
};
use switchtrace_protocols::interface::{canonicalize, classify};
use switchtrace_protocols::rows::{self, MacTableRow};
use tracing::debug;

use crate::characterize::characterize;
use crate::session::{self, Attempt, DeviceSession};

/// MAC table lookups from most to least specific. The last entry dumps the
/// whole table and gets the scan budget.
pub fn lookup_commands(mac: &MacAddress, vlan_hint: Option<VlanId>) -> Vec<String> {
    let dotted = mac.dotted();
    let colon = mac.colon();

    let mut commands = Vec::with_capacity(7);
    if let Some(vlan) = vlan_hint {
        commands.push(format!("show mac address-table vlan {vlan} address {dotted}"));
    }
    commands.push(format!("show mac address-table address {dotted}"));
    commands.push(format!("show mac address-table address {colon}"));
    commands.push(format!("show mac address-table | include {dotted}"));
    commands.push(format!("show mac address-table | include {colon}"));
    commands.push(format!("show mac address-table | include {}", mac.bare()));
    commands.push(FULL_TABLE.to_string());
    commands
}

const FULL_TABLE: &str = "show mac address-table";

/// A physical-port row whose port could not be characterized.
struct Tentative {
    interface: InterfaceName,
    vlan: Option<VlanId>,
}

enum RowVerdict {
    Accept {
        interface: InterfaceName,
        vlan: Option<VlanId>,
    },
    Reject,
}

fn judge(row: MacTableRow, vlan_hint: Option<VlanId>, port_limit: u32) -> RowVerdict {
    let interface = canonicalize(&row.port);
    if classify(interface.as_str(), port_limit) != PortClass::PhysicalAccess {
        return RowVerdict::Reject;
    }

    RowVerdict::Accept {
        interface,
        vlan: row.vlan.or(vlan_hint),
    }
}

/// Asks one device on which physical port it learned `mac`.
///
/// Rows naming logical interfaces (port-channels, SVIs) are skipped and the
/// scan continues, so a later row for a member port still wins. A row without
/// a VLAN column is still accepted, taking the hint when there is one. When
/// no physical port could be characterized, the first one seen comes back
/// with [`Confidence::Unknown`] and no characterization.
pub async fn locate(
    session: &mut dyn DeviceSession,
    device: &str,
    registry_index: usize,
    mac: &MacAddress,
    vlan_hint: Option<VlanId>,
    config: &Config,
) -> Option<PortCandidate> {
    let mut tentative: Option<Tentative> = None;

    for command in lookup_commands(mac, vlan_hint) {
        let budget: Duration = if command == FULL_TABLE {
            config.scan_timeout
        } else {
            config.command_timeout
        };

        let Attempt::Found(output) = session::run(session, device, &command, budget).await else {
            continue;
        };

        for line in output.lines() {
            let Some(row) = rows::mac_table_row(line, mac) else {
                continue;
            };

            let RowVerdict::Accept { interface, vlan } =
                judge(row, vlan_hint, config.physical_port_limit)
            else {
                debug!(device, line = line.trim(), "skipping non-physical row");
                continue;
            };

            debug!(device, %interface, vlan = ?vlan, "address learned on physical port");
            match characterize(session, device, &interface, config).await {
                Some(characterization) => {
                    return Some(PortCandidate {
                        device: device.to_string(),
                        registry_index,
                        interface,
                        vlan_id: vlan,
                        characterization,
                        confidence: Confidence::Dynamic,
                        score: 0,
                    });
                }
                None => {
                    debug!(device, %interface, "port could not be characterized");
                    tentative.get_or_insert(Tentative { interface, vlan });
                }
            }
        }
    }

    tentative.map(|sighting| PortCandidate {
        device: device.to_string(),
        registry_index,
        interface: sighting.interface,
        vlan_id: sighting.vlan,
        characterization: PortCharacterization::default(),
        confidence: Confidence::Unknown,
        score: 0,
    })
}
