//! Row extractors for the show commands the resolver and locator issue.
//!
//! Device families disagree on column order, so the extractors anchor on
//! token shapes (a MAC, a VLAN number followed by an interface, a trailing
//! interface) rather than on column positions.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use switchtrace_common::model::{MacAddress, VlanId};

use crate::patterns::{self, find_mac_token};

/// What one table row says about the target address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHit {
    pub mac: MacAddress,
    pub vlan: Option<VlanId>,
    /// Interface token exactly as printed.
    pub interface: Option<String>,
}

/// Pulls a [`RowHit`] out of the matching `line`. `output` is the full command
/// output, for the formats that print the VLAN outside the row.
pub type RowExtractor = fn(line: &str, output: &str) -> Option<RowHit>;

static HARDWARE_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)address is\s+([0-9a-f.:]+)").unwrap());

static VLAN_THEN_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s(\d+)\s+([A-Za-z]+\d+(?:/\d+)*\S*)").unwrap());

static TRAILING_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s([A-Za-z0-9/.]+)\s*$").unwrap());

static INNER_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s([A-Za-z]+[0-9/.]+)\s").unwrap());

static STANDALONE_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(\d+)\s").unwrap());

static TRAILING_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z]+\d+(?:/\d+)*\S*)\s*$").unwrap());

static SWITCH_OWNED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:CPU|ROUTER)\b").unwrap());

static TRUNK_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:Operational|Administrative)\s+Mode:\s*trunk").unwrap());

static ACCESS_VLAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Access Mode VLAN:\s*(\d+)?").unwrap());

static NATIVE_VLAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Trunking Native Mode VLAN:\s*(\d+)").unwrap());

static CDP_NEIGHBOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Device ID|System Name").unwrap());

static LLDP_NEIGHBOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)System Name|Chassis id").unwrap());

static DYNAMIC_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bDYNAMIC\b").unwrap());

static DOTTED_MAC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[0-9a-f]{4}\.[0-9a-f]{4}\.[0-9a-f]{4}").unwrap());

fn mac_in(line: &str) -> Option<MacAddress> {
    find_mac_token(line).and_then(|token| MacAddress::parse(token).ok())
}

/// Name of the local interface that owns `ip`, from `show ip interface brief`.
pub fn ip_brief_interface(output: &str, ip: &IpAddr) -> Option<String> {
    let ip = ip.to_string();
    output.lines().find_map(|line| {
        let mut columns = line.split_whitespace();
        let interface = columns.next()?;
        (columns.next()? == ip).then(|| interface.to_string())
    })
}

/// The hardware address from `show interface <if> | include address is`.
pub fn hardware_address(output: &str) -> Option<MacAddress> {
    HARDWARE_ADDRESS
        .captures(output)
        .and_then(|caps| MacAddress::parse(&caps[1]).ok())
}

/// `show ip dhcp snooping binding`:
/// `MacAddress  IpAddress  Lease(sec)  Type  VLAN  Interface`.
pub fn dhcp_binding_row(line: &str, _output: &str) -> Option<RowHit> {
    let mac = mac_in(line)?;
    let (mut vlan, interface) = match VLAN_THEN_INTERFACE.captures(line) {
        Some(caps) => (caps[1].parse::<VlanId>().ok(), Some(caps[2].to_string())),
        None => (None, None),
    };

    if vlan.is_none() {
        vlan = patterns::vlan_from_text(line)
            .or_else(|| interface.as_deref().and_then(patterns::vlan_from_interface_name));
    }

    Some(RowHit { mac, vlan, interface })
}

/// `show ip arp` / `show arp`: the interface is the last column.
pub fn arp_row(line: &str, _output: &str) -> Option<RowHit> {
    let mac = mac_in(line)?;
    let interface = TRAILING_INTERFACE
        .captures(line)
        .map(|caps| caps[1].to_string());
    let vlan = patterns::vlan_from_interface_or_text(interface.as_deref(), line);
    Some(RowHit { mac, vlan, interface })
}

/// `show ip device tracking all` / `show device tracking database`.
///
/// The older format prints the VLAN in a header line, so the whole output is
/// searched before falling back to the interface name.
pub fn tracking_row(line: &str, output: &str) -> Option<RowHit> {
    let mac = mac_in(line)?;
    let interface = INNER_INTERFACE
        .captures(line)
        .map(|caps| caps[1].to_string());
    let vlan = patterns::vlan_from_text(output)
        .or_else(|| interface.as_deref().and_then(patterns::vlan_from_interface_name));
    Some(RowHit { mac, vlan, interface })
}

/// One qualifying row of `show mac address-table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacTableRow {
    /// First standalone integer on the line.
    pub vlan: Option<VlanId>,
    /// First entry of the trailing port column, as printed.
    pub port: String,
}

/// Entries the switch owns itself (`CPU`, `ROUTER`).
pub fn is_switch_owned(line: &str) -> bool {
    SWITCH_OWNED.is_match(line)
}

/// Parses a MAC table row that mentions `mac` in any notation.
///
/// Returns `None` for rows about other addresses, switch-owned rows and rows
/// without a trailing port token. When the port column is a list
/// (`Gi1/0/48,Po1`), only the first entry is kept.
pub fn mac_table_row(line: &str, mac: &MacAddress) -> Option<MacTableRow> {
    let lower = line.to_ascii_lowercase();
    if !mac.notations().iter().any(|n| lower.contains(n.as_str())) {
        return None;
    }
    if is_switch_owned(line) {
        return None;
    }

    let vlan = STANDALONE_INTEGER
        .captures(line)
        .and_then(|caps| caps[1].parse::<VlanId>().ok());
    let raw = TRAILING_PORT.captures(line)?;
    let port = raw[1].split(',').next()?.trim().to_string();
    if port.is_empty() {
        return None;
    }

    Some(MacTableRow { vlan, port })
}

/// Trunk/access state from `show interfaces <if> switchport`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchportMode {
    pub is_trunk: bool,
    pub is_access: bool,
    pub access_vlan: Option<VlanId>,
    pub native_vlan: Option<VlanId>,
}

pub fn switchport_mode(output: &str) -> SwitchportMode {
    let is_trunk = TRUNK_MODE.is_match(output);
    let access = ACCESS_VLAN.captures(output);

    SwitchportMode {
        is_trunk,
        is_access: access.is_some() && !is_trunk,
        access_vlan: access
            .as_ref()
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok()),
        native_vlan: NATIVE_VLAN
            .captures(output)
            .and_then(|caps| caps[1].parse().ok()),
    }
}

pub fn cdp_neighbor_present(output: &str) -> bool {
    CDP_NEIGHBOR.is_match(output)
}

pub fn lldp_neighbor_present(output: &str) -> bool {
    LLDP_NEIGHBOR.is_match(output)
}

/// Approximate number of addresses learned on a port: `DYNAMIC` entries when
/// the table prints a type column, otherwise dot-grouped addresses.
pub fn learned_address_count(output: &str) -> u32 {
    let dynamic = DYNAMIC_ENTRY.find_iter(output).count();
    let count = if dynamic > 0 {
        dynamic
    } else {
        DOTTED_MAC.find_iter(output).count()
    };
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac() -> MacAddress {
        MacAddress::parse("001b.2b3c.4d5e").unwrap()
    }

    #[test]
    fn ip_brief_interface_reads_first_column() {
        let output = "Vlan1                  10.1.1.10       YES NVRAM  up                    up\n\
                      Vlan10                 10.1.1.1        YES manual up                    up";
        let ip: IpAddr = "10.1.1.1".parse().unwrap();
        assert_eq!(ip_brief_interface(output, &ip).as_deref(), Some("Vlan10"));
        let missing: IpAddr = "10.1.1.2".parse().unwrap();
        assert_eq!(ip_brief_interface(output, &missing), None);
    }

    #[test]
    fn hardware_address_requires_full_mac() {
        let output = "  Hardware is EtherSVI, address is 001b.2b3c.4d5e (bia 001b.2b3c.4d5e)";
        assert_eq!(hardware_address(output), Some(mac()));
        assert_eq!(hardware_address("Hardware is EtherSVI, address is 001b.2b3c"), None);
    }

    #[test]
    fn dhcp_binding_row_reads_vlan_and_interface() {
        let line = "00:1B:2B:3C:4D:5E   10.1.1.5         86183       dhcp-snooping   10    GigabitEthernet1/0/5";
        let hit = dhcp_binding_row(line, line).unwrap();
        assert_eq!(hit.mac, mac());
        assert_eq!(hit.vlan.map(VlanId::get), Some(10));
        assert_eq!(hit.interface.as_deref(), Some("GigabitEthernet1/0/5"));
    }

    #[test]
    fn arp_row_reads_trailing_interface() {
        let line = "Internet  10.1.1.5               3   001b.2b3c.4d5e  ARPA   Vlan10";
        let hit = arp_row(line, line).unwrap();
        assert_eq!(hit.mac, mac());
        assert_eq!(hit.interface.as_deref(), Some("Vlan10"));
        assert_eq!(hit.vlan.map(VlanId::get), Some(10));
    }

    #[test]
    fn arp_row_without_mac_is_a_miss() {
        let line = "Internet  10.1.1.5               0   Incomplete      ARPA";
        assert_eq!(arp_row(line, line), None);
    }

    #[test]
    fn tracking_row_reads_interface_column() {
        let output = "IP Device Tracking = Enabled\n\
                      10.1.1.5         001b.2b3c.4d5e  GigabitEthernet1/0/5   10  0005  ACTIVE";
        let line = output.lines().nth(1).unwrap();
        let hit = tracking_row(line, output).unwrap();
        assert_eq!(hit.interface.as_deref(), Some("GigabitEthernet1/0/5"));
        assert_eq!(hit.vlan, None);
    }

    #[test]
    fn mac_table_row_matches_any_notation() {
        let row = mac_table_row("  10    001b.2b3c.4d5e    DYNAMIC     Gi1/0/5", &mac()).unwrap();
        assert_eq!(row.vlan.map(VlanId::get), Some(10));
        assert_eq!(row.port, "Gi1/0/5");

        let row = mac_table_row("10 00:1b:2b:3c:4d:5e dynamic Eth1/7", &mac()).unwrap();
        assert_eq!(row.vlan.map(VlanId::get), Some(10));
        assert_eq!(row.port, "Eth1/7");
    }

    #[test]
    fn mac_table_row_keeps_first_member_of_port_list() {
        let row = mac_table_row(" 10  001b.2b3c.4d5e  DYNAMIC  Gi1/0/48,Po1", &mac()).unwrap();
        assert_eq!(row.port, "Gi1/0/48");
    }

    #[test]
    fn mac_table_row_skips_foreign_and_switch_owned_rows() {
        assert_eq!(mac_table_row(" 10  aaaa.bbbb.cccc  DYNAMIC  Gi1/0/5", &mac()), None);
        assert_eq!(mac_table_row(" All 001b.2b3c.4d5e STATIC CPU", &mac()), None);
    }

    #[test]
    fn switchport_mode_for_access_port() {
        let output = "Name: Gi1/0/5\nSwitchport: Enabled\nAdministrative Mode: static access\n\
                      Operational Mode: static access\nAccess Mode VLAN: 10 (USERS)\n\
                      Trunking Native Mode VLAN: 1 (default)";
        let mode = switchport_mode(output);
        assert!(mode.is_access);
        assert!(!mode.is_trunk);
        assert_eq!(mode.access_vlan.map(VlanId::get), Some(10));
        assert_eq!(mode.native_vlan.map(VlanId::get), Some(1));
    }

    #[test]
    fn switchport_mode_for_trunk_port() {
        let output = "Administrative Mode: trunk\nOperational Mode: trunk\n\
                      Access Mode VLAN: 1 (default)\nTrunking Native Mode VLAN: 99 (NATIVE)";
        let mode = switchport_mode(output);
        assert!(mode.is_trunk);
        assert!(!mode.is_access);
        assert_eq!(mode.native_vlan.map(VlanId::get), Some(99));
    }

    #[test]
    fn neighbor_detection() {
        assert!(cdp_neighbor_present("Device ID: SW-CORE\nEntry address(es):"));
        assert!(!cdp_neighbor_present("Total cdp entries displayed : 0"));
        assert!(lldp_neighbor_present("Chassis id: 0011.2233.4455\nSystem Name: SW2"));
        assert!(!lldp_neighbor_present("Total entries displayed: 0"));
    }

    #[test]
    fn learned_address_count_prefers_dynamic_column() {
        let output = " 10  001b.2b3c.4d5e  DYNAMIC  Gi1/0/5\n 10  0011.2233.4455  STATIC  Gi1/0/5";
        assert_eq!(learned_address_count(output), 1);
        let output = " 10  001b.2b3c.4d5e  Gi1/0/5\n 10  0011.2233.4455  Gi1/0/5";
        assert_eq!(learned_address_count(output), 2);
        assert_eq!(learned_address_count(""), 0);
    }
}
