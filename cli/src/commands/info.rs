use colored::*;
use switchtrace_common::config::{Config, ScoreWeights};
use switchtrace_common::model::ResolutionSource;

use crate::mprint;
use crate::terminal::{colors, print};

const SOURCES: [(ResolutionSource, &str); 5] = [
    (ResolutionSource::LocalInterface, "address configured on the device itself"),
    (ResolutionSource::DhcpSnooping, "DHCP snooping binding table"),
    (ResolutionSource::Arp, "ARP entry for the address"),
    (ResolutionSource::ArpScan, "full ARP table, every VRF"),
    (ResolutionSource::DeviceTracking, "IP device tracking database"),
];

pub fn info(q_level: u8) {
    print::note(format!(
        "{} {}",
        env!("CARGO_PKG_NAME").color(colors::PRIMARY).bold(),
        env!("CARGO_PKG_VERSION").color(colors::ACCENT)
    ));
    print::note("Finds the switch port an IP address is connected to.");
    mprint!();

    print::section("ip → mac sources", q_level);
    for (idx, (source, what)) in SOURCES.iter().enumerate() {
        print::entry(idx, source.as_str());
        print::details(&[("What".to_string(), what.normal())]);
    }

    mprint!();
    print::section("port ranking", q_level);
    let w = ScoreWeights::default();
    let width = "few learned MACs".len();
    let rows = [
        ("access port", format!("+{}", w.access_mode)),
        ("trunk / other", format!("-{}", w.access_mode)),
        ("cdp/lldp neighbor", format!("-{}", w.neighbor_penalty)),
        ("crowded port", format!("-{} (>= {} MACs)", w.crowded_penalty, w.crowded_threshold)),
        ("busy port", format!("-{} (>= {} MACs)", w.busy_penalty, w.busy_threshold)),
        ("few learned MACs", format!("+{}", w.quiet_bonus)),
        ("vlan of interest", format!("+{}", w.vlan_match_bonus)),
        ("uplink name", format!("-{}", w.uplink_penalty)),
    ];
    for (key, value) in rows {
        print::field(key, value, width);
    }

    mprint!();
    let cfg = Config::default();
    print::field(
        "port limit",
        cfg.physical_port_limit.to_string(),
        width,
    );
    print::field(
        "cmd timeout",
        format!("{}s", cfg.command_timeout.as_secs()),
        width,
    );
}
