//! Interface name canonicalization and port classification.

use std::sync::LazyLock;

use regex::Regex;
use switchtrace_common::model::{InterfaceName, PortClass};

/// Default upper bound of the access-port range on a switch stack member.
pub const DEFAULT_PHYSICAL_PORT_LIMIT: u32 = 48;

const LONG_PREFIXES: [&str; 7] = [
    "FastEthernet",
    "GigabitEthernet",
    "TenGigabitEthernet",
    "Port-channel",
    "Vlan",
    "Loopback",
    "Serial",
];

static ETHERNET_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(FastEthernet|GigabitEthernet|TenGigabitEthernet)\d*/?\d*/?(\d+)$").unwrap()
});

static UPLINK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Po\d+|Port-Channel|^Te|^Fo").unwrap());

fn expand_short_prefix(prefix: &str) -> Option<&'static str> {
    let short: String = prefix.chars().take(2).collect::<String>().to_ascii_lowercase();
    match short.as_str() {
        "fa" => Some("FastEthernet"),
        "gi" => Some("GigabitEthernet"),
        "te" => Some("TenGigabitEthernet"),
        "po" => Some("Port-channel"),
        "vl" => Some("Vlan"),
        "lo" => Some("Loopback"),
        "se" => Some("Serial"),
        _ => None,
    }
}

/// Expands abbreviated interface names (`Gi1/0/5` → `GigabitEthernet1/0/5`).
///
/// Names already in long form, names with an unknown prefix and names that do
/// not start with letters are returned unchanged (trimmed).
pub fn canonicalize(name: &str) -> InterfaceName {
    let name = name.trim();
    let lower = name.to_ascii_lowercase();

    if LONG_PREFIXES
        .iter()
        .any(|long| lower.starts_with(&long.to_ascii_lowercase()))
    {
        return InterfaceName::from_canonical(name);
    }

    let split = name
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(name.len());
    let (prefix, rest) = name.split_at(split);
    if prefix.is_empty() || rest.is_empty() {
        return InterfaceName::from_canonical(name);
    }

    match expand_short_prefix(prefix) {
        Some(long) => InterfaceName::from_canonical(format!("{long}{rest}")),
        None => InterfaceName::from_canonical(name),
    }
}

/// Classifies an interface, treating Ethernet ports whose trailing index
/// exceeds `limit` as non-access.
pub fn classify(name: &str, limit: u32) -> PortClass {
    let canonical = canonicalize(name);
    let name = canonical.as_str();
    let lower = name.to_ascii_lowercase();

    if name.eq_ignore_ascii_case("cpu") || name.eq_ignore_ascii_case("router") {
        return PortClass::Excluded;
    }

    if ["vlan", "port-channel", "loopback", "serial"]
        .iter()
        .any(|p| lower.starts_with(p))
    {
        return PortClass::Logical;
    }

    let within_budget = ETHERNET_PORT
        .captures(name)
        .and_then(|caps| caps[2].parse::<u32>().ok())
        .is_some_and(|index| index <= limit);

    if within_budget {
        PortClass::PhysicalAccess
    } else {
        PortClass::Other
    }
}

pub fn is_physical_access_port_with_limit(name: &str, limit: u32) -> bool {
    classify(name, limit) == PortClass::PhysicalAccess
}

pub fn is_physical_access_port(name: &str) -> bool {
    is_physical_access_port_with_limit(name, DEFAULT_PHYSICAL_PORT_LIMIT)
}

/// Aggregates and high-speed ports (`Port-channel`, `Te…`, `Fo…`) are treated
/// as uplinks when ranking sightings.
pub fn is_uplink_name(name: &str) -> bool {
    UPLINK_NAME.is_match(name)
}
