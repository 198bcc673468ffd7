//! MAC, IP and VLAN token matching shared by every row parser.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use switchtrace_common::model::VlanId;

/// MAC notations in precedence order. The dot-grouped form is the most
/// specific and the least likely to match something that is not an address.
static MAC_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}").unwrap(),
        Regex::new(r"[0-9a-fA-F]{2}(?::[0-9a-fA-F]{2}){5}").unwrap(),
        Regex::new(r"[0-9a-fA-F]{12}").unwrap(),
    ]
});

static VLAN_IN_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[Vv]lan(\d+)").unwrap());

static VLAN_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vlan\s*:?[\s#]*([0-9]+)").unwrap());

/// Drops every non-hex character and lowercases the rest.
///
/// The result is not validated: callers must check for 12 digits before
/// treating it as a complete address.
pub fn normalize_mac(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Returns the first MAC-looking token in `text`, trying the dot-grouped,
/// colon-grouped and bare notations in that order.
pub fn find_mac_token(text: &str) -> Option<&str> {
    MAC_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(|m| m.as_str())
}

/// True when `ip` occurs in `line` as a whole token: the characters around the
/// match must not be digits, so `1.1.1.1` does not match `11.1.1.10`.
pub fn line_contains_ip(line: &str, ip: &str) -> bool {
    if ip.is_empty() {
        return false;
    }

    line.match_indices(ip).any(|(start, _)| {
        let before = line[..start].chars().next_back();
        let after = line[start + ip.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
    })
}

/// The first line of a command's output that carries `ip` as a whole token.
pub fn first_line_with_ip<'a>(output: &'a str, ip: &IpAddr) -> Option<&'a str> {
    let ip = ip.to_string();
    output.lines().find(|line| line_contains_ip(line, &ip))
}

/// `Vlan10` → 10.
pub fn vlan_from_interface_name(name: &str) -> Option<VlanId> {
    VLAN_IN_INTERFACE
        .captures(name)
        .and_then(|caps| caps[1].parse().ok())
}

/// `VLAN: 10`, `vlan 10`, `Vlan #10` → 10.
pub fn vlan_from_text(text: &str) -> Option<VlanId> {
    VLAN_IN_TEXT
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// The interface-name form wins over free text when both are present.
pub fn vlan_from_interface_or_text(interface: Option<&str>, text: &str) -> Option<VlanId> {
    interface
        .and_then(vlan_from_interface_name)
        .or_else(|| vlan_from_text(text))
}
