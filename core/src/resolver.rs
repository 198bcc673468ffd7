//! IP→MAC resolution on a single device.
//!
//! The device is asked through up to five independent sources, in a fixed
//! order, until one of them yields a complete hardware address:
//!
//! | order | source            | commands                                   |
//! |-------|-------------------|--------------------------------------------|
//! | A     | local interface   | `show ip interface brief`, `show interface`|
//! | B     | DHCP snooping     | `show ip dhcp snooping binding`            |
//! | C     | targeted ARP      | `show ip arp <ip>`                         |
//! | D     | ARP scan          | `show ip arp`, `show arp`, all VRFs        |
//! | E     | device tracking   | old and new tracking table syntax          |
//!
//! A source that errors or finds nothing never stops the search on this device.

use std::net::IpAddr;
use std::time::Duration;

use switchtrace_common::config::Config;
use switchtrace_common::error::SessionError;
use switchtrace_common::model::{IpMacResolution, ResolutionSource};
use switchtrace_protocols::patterns::{self, first_line_with_ip, line_contains_ip};
use switchtrace_protocols::rows::{self, RowExtractor, RowHit};
use tracing::debug;

use crate::session::{self, Attempt, DeviceSession};

/// Which wait budget a source's commands use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Budget {
    Lookup,
    Scan,
}

impl Budget {
    fn of(self, config: &Config) -> Duration {
        match self {
            Budget::Lookup => config.command_timeout,
            Budget::Scan => config.scan_timeout,
        }
    }
}

enum Probe {
    /// Two-step lookup of an address configured on the device itself.
    LocalInterface,
    /// Scan the output of each command for a row carrying the address.
    Table {
        commands: fn(&str) -> Vec<String>,
        extract: RowExtractor,
        budget: Budget,
    },
}

pub struct SourceEntry {
    pub source: ResolutionSource,
    probe: Probe,
}

fn dhcp_commands(ip: &str) -> Vec<String> {
    vec![
        format!("show ip dhcp snooping binding | include {ip}"),
        "show ip dhcp snooping binding".to_string(),
    ]
}

fn arp_commands(ip: &str) -> Vec<String> {
    vec![format!("show ip arp {ip}")]
}

fn arp_scan_commands(_ip: &str) -> Vec<String> {
    vec![
        "show ip arp".to_string(),
        "show arp".to_string(),
        "show ip arp vrf all".to_string(),
    ]
}

fn tracking_commands(ip: &str) -> Vec<String> {
    vec![
        format!("show ip device tracking all | include {ip}"),
        "show ip device tracking all".to_string(),
        format!("show device tracking database | include {ip}"),
        "show device tracking database".to_string(),
    ]
}

/// Discovery sources in probe order.
pub static SOURCES: [SourceEntry; 5] = [
    SourceEntry {
        source: ResolutionSource::LocalInterface,
        probe: Probe::LocalInterface,
    },
    SourceEntry {
        source: ResolutionSource::DhcpSnooping,
        probe: Probe::Table {
            commands: dhcp_commands,
            extract: rows::dhcp_binding_row,
            budget: Budget::Lookup,
        },
    },
    SourceEntry {
        source: ResolutionSource::Arp,
        probe: Probe::Table {
            commands: arp_commands,
            extract: rows::arp_row,
            budget: Budget::Lookup,
        },
    },
    SourceEntry {
        source: ResolutionSource::ArpScan,
        probe: Probe::Table {
            commands: arp_scan_commands,
            extract: rows::arp_row,
            budget: Budget::Scan,
        },
    },
    SourceEntry {
        source: ResolutionSource::DeviceTracking,
        probe: Probe::Table {
            commands: tracking_commands,
            extract: rows::tracking_row,
            budget: Budget::Scan,
        },
    },
];

/// Asks one device for the MAC behind `ip`.
///
/// Returns `None` when every source came up empty; that is a normal outcome,
/// the caller simply moves on to the next device.
pub async fn resolve(
    session: &mut dyn DeviceSession,
    device: &str,
    ip: IpAddr,
    config: &Config,
) -> Option<IpMacResolution> {
    if config.prime_arp {
        prime_arp_cache(session, device, ip, config).await;
    }

    for entry in SOURCES.iter() {
        let attempt = match &entry.probe {
            Probe::LocalInterface => probe_local_interface(session, device, ip, config).await,
            Probe::Table {
                commands,
                extract,
                budget,
            } => {
                let commands = commands(&ip.to_string());
                probe_table(session, device, ip, &commands, *extract, budget.of(config)).await
            }
        };

        match attempt {
            Attempt::Found(hit) => {
                debug!(device, source = %entry.source, mac = %hit.mac, "address resolved");
                return Some(IpMacResolution {
                    ip,
                    mac: hit.mac,
                    vlan_id: hit.vlan,
                    interface: hit.interface,
                    source: entry.source,
                    origin_device: device.to_string(),
                });
            }
            Attempt::Empty => debug!(device, source = %entry.source, "no binding"),
            Attempt::Failed(e) => debug!(device, source = %entry.source, error = %e, "source unavailable"),
        }
    }

    None
}

/// Pings the target once so silent hosts get an ARP entry. The result is
/// irrelevant.
async fn prime_arp_cache(session: &mut dyn DeviceSession, device: &str, ip: IpAddr, config: &Config) {
    let command = format!("ping {ip} repeat 2 timeout 1");
    let _ = session::run(session, device, &command, config.command_timeout).await;
}

/// Source A: the address belongs to one of the device's own interfaces.
async fn probe_local_interface(
    session: &mut dyn DeviceSession,
    device: &str,
    ip: IpAddr,
    config: &Config,
) -> Attempt<RowHit> {
    let budget = config.command_timeout;
    let ip_text = ip.to_string();

    let brief = match session::run(
        session,
        device,
        &format!("show ip interface brief | include {ip_text}"),
        budget,
    )
    .await
    {
        Attempt::Found(output) if line_contains_ip(&output, &ip_text) => output,
        Attempt::Failed(e) => return Attempt::Failed(e),
        _ => return Attempt::Empty,
    };

    let Some(interface) = rows::ip_brief_interface(&brief, &ip) else {
        return Attempt::Empty;
    };

    let detail = session::run(
        session,
        device,
        &format!("show interface {interface} | include address is"),
        budget,
    )
    .await;

    match detail {
        Attempt::Found(output) => match rows::hardware_address(&output) {
            Some(mac) => Attempt::Found(RowHit {
                mac,
                vlan: patterns::vlan_from_interface_or_text(Some(&interface), &brief),
                interface: Some(interface),
            }),
            None => Attempt::Empty,
        },
        Attempt::Empty => Attempt::Empty,
        Attempt::Failed(e) => Attempt::Failed(e),
    }
}

/// Sources B to E: find the first row carrying the address in each command's
/// output. Rows without a complete MAC are skipped in favour of the next
/// command.
async fn probe_table(
    session: &mut dyn DeviceSession,
    device: &str,
    ip: IpAddr,
    commands: &[String],
    extract: RowExtractor,
    budget: Duration,
) -> Attempt<RowHit> {
    let mut last_error: Option<SessionError> = None;

    for command in commands {
        let output = match session::run(session, device, command, budget).await {
            Attempt::Found(output) => output,
            Attempt::Empty => continue,
            Attempt::Failed(e) => {
                last_error = Some(e);
                continue;
            }
        };

        let Some(line) = first_line_with_ip(&output, &ip) else {
            continue;
        };

        if let Some(hit) = extract(line, &output) {
            return Attempt::Found(hit);
        }
    }

    match last_error {
        Some(e) => Attempt::Failed(e),
        None => Attempt::Empty,
    }
}
