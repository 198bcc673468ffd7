use std::net::IpAddr;

use colored::*;
use switchtrace_common::model::{
    Confidence, DeviceFailure, IpMacResolution, LocationResult, MacAddress, PortCharacterization,
};

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

fn detail(key: &str, value: ColoredString) -> Detail {
    (key.to_string(), value)
}

pub fn ip_to_detail(ip: &IpAddr) -> Detail {
    match ip {
        IpAddr::V4(v4) => detail("IPv4", v4.to_string().color(colors::IPV4_ADDR)),
        IpAddr::V6(v6) => detail("IPv6", v6.to_string().color(colors::IPV6_ADDR)),
    }
}

pub fn mac_to_detail(mac: &MacAddress) -> Detail {
    detail("MAC", mac.to_string().color(colors::MAC_ADDR))
}

pub fn vendor_to_detail(vendor: &Option<String>) -> Option<Detail> {
    vendor
        .as_ref()
        .map(|v| detail("Vendor", v.as_str().color(colors::TEXT_DEFAULT)))
}

fn port_mode(port: &PortCharacterization) -> ColoredString {
    match (port.is_access, port.is_trunk) {
        (true, false) => "access".color(colors::GOOD),
        (_, true) => "trunk".color(colors::BAD),
        _ => "unknown".dimmed(),
    }
}

fn confidence(confidence: Confidence, score: i32) -> ColoredString {
    let text = format!("{confidence} (score {score})");
    match confidence {
        Confidence::Dynamic if score > 0 => text.color(colors::GOOD).bold(),
        Confidence::Dynamic => text.color(colors::ACCENT),
        Confidence::Unknown => text.color(colors::BAD),
    }
}

/// Everything worth showing about a located host.
pub fn location_details(result: &LocationResult) -> Vec<Detail> {
    let port = &result.characterization;
    let mut details = vec![
        detail("Port", result.interface.as_str().color(colors::PORT).bold()),
        ip_to_detail(&result.ip),
        mac_to_detail(&result.mac),
    ];

    if let Some(vlan) = result.vlan {
        details.push(detail("VLAN", vlan.to_string().color(colors::VLAN)));
    }
    details.push(detail("Mode", port_mode(port)));
    if port.has_neighbor {
        details.push(detail("Neighbor", "present".color(colors::BAD)));
    }
    if let Some(count) = port.mac_count {
        details.push(detail("MACs", count.to_string().normal()));
    }
    details.push(detail("Match", confidence(result.confidence, result.score)));
    details.push(detail("Source", result.source.as_str().dimmed()));
    if let Some(vendor) = vendor_to_detail(&result.vendor) {
        details.push(vendor);
    }

    details
}

pub fn resolution_details(resolution: &IpMacResolution) -> Vec<Detail> {
    let mut details = vec![ip_to_detail(&resolution.ip), mac_to_detail(&resolution.mac)];
    if let Some(vlan) = resolution.vlan_id {
        details.push(detail("VLAN", vlan.to_string().color(colors::VLAN)));
    }
    details.push(detail("Seen on", resolution.origin_device.as_str().color(colors::PRIMARY)));
    details.push(detail("Source", resolution.source.as_str().dimmed()));
    details
}

pub fn failure_details(failures: &[DeviceFailure]) -> Vec<Detail> {
    failures
        .iter()
        .map(|f| {
            let value = format!("{} ({})", f.reason, f.stage).color(colors::BAD);
            (f.device.clone(), value)
        })
        .collect()
}

/// `device port` for the single-line quiet output.
pub fn one_line(result: &LocationResult) -> String {
    let vlan = result
        .vlan
        .map(|v| format!(" vlan {v}"))
        .unwrap_or_default();
    format!(
        "{} {} {} {}{}",
        result.ip, result.mac, result.device, result.interface, vlan
    )
}
