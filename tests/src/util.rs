use std::net::IpAddr;
use std::sync::Arc;

use switchtrace_common::config::Config;
use switchtrace_common::model::{DeviceDescriptor, DeviceRegistry, LocateOutcome, VlanId};
use switchtrace_core::Orchestrator;
use switchtrace_core::session::scripted::{DeviceScript, ScriptedFactory};

pub const TARGET: &str = "10.1.1.5";
pub const MAC: &str = "001b.2b3c.4d5e";

pub fn target() -> IpAddr {
    TARGET.parse().unwrap()
}

pub fn vlan(id: u16) -> VlanId {
    VlanId::new(id).unwrap()
}

pub fn registry(names: &[&str]) -> DeviceRegistry {
    let devices = names
        .iter()
        .enumerate()
        .map(|(i, name)| DeviceDescriptor::new(name, &format!("192.0.2.{}", i + 1), "netops", "pw"))
        .collect();
    DeviceRegistry::new(devices).unwrap()
}

pub fn config(vlan_of_interest: Option<u16>, parallel: usize) -> Config {
    Config {
        vlan_of_interest: vlan_of_interest.map(vlan),
        stage2_concurrency: parallel,
        no_vendor: true,
        ..Config::default()
    }
}

pub async fn run(names: &[&str], factory: &ScriptedFactory, cfg: Config) -> LocateOutcome {
    Orchestrator::new(registry(names), cfg, Arc::new(factory.clone()))
        .locate(target())
        .await
}

fn long_name(port: &str) -> String {
    port.replacen("Gi", "GigabitEthernet", 1)
}

/// Builders for the canned output of one switch.
pub trait SwitchScript {
    fn knows_target_in_arp(self) -> Self;
    fn learned_on(self, command: &str, vlan: u16, port: &str) -> Self;
    fn access_port(self, port: &str, vlan: u16) -> Self;
    fn trunk_port(self, port: &str) -> Self;
    fn cdp_neighbor(self, port: &str, neighbor: &str) -> Self;
    fn port_addresses(self, port: &str, count: usize) -> Self;
}

pub fn hinted_lookup(vlan: u16) -> String {
    format!("show mac address-table vlan {vlan} address {MAC}")
}

pub fn address_lookup() -> String {
    format!("show mac address-table address {MAC}")
}

impl SwitchScript for DeviceScript {
    fn knows_target_in_arp(self) -> Self {
        self.respond(
            &format!("show ip arp {TARGET}"),
            &format!(
                "Protocol  Address          Age (min)  Hardware Addr   Type   Interface\n\
                 Internet  {TARGET}                4   {MAC}  ARPA   Vlan10"
            ),
        )
    }

    fn learned_on(self, command: &str, vlan: u16, port: &str) -> Self {
        self.respond(
            command,
            &format!(
                "          Mac Address Table\n\
                 -------------------------------------------\n\
                 Vlan    Mac Address       Type        Ports\n\
                 ----    -----------       --------    -----\n\
                 {vlan:>4}    {MAC}    DYNAMIC     {port}\n\
                 Total Mac Addresses for this criterion: 1"
            ),
        )
    }

    fn access_port(self, port: &str, vlan: u16) -> Self {
        self.respond(
            &format!("show interfaces {} switchport", long_name(port)),
            &format!(
                "Name: {port}\n\
                 Switchport: Enabled\n\
                 Administrative Mode: static access\n\
                 Operational Mode: static access\n\
                 Access Mode VLAN: {vlan} (USERS)"
            ),
        )
    }

    fn trunk_port(self, port: &str) -> Self {
        self.respond(
            &format!("show interfaces {} switchport", long_name(port)),
            &format!(
                "Name: {port}\n\
                 Switchport: Enabled\n\
                 Administrative Mode: trunk\n\
                 Operational Mode: trunk\n\
                 Trunking Native Mode VLAN: 1 (default)"
            ),
        )
    }

    fn cdp_neighbor(self, port: &str, neighbor: &str) -> Self {
        self.respond(
            &format!("show cdp neighbors interface {} detail", long_name(port)),
            &format!(
                "-------------------------\n\
                 Device ID: {neighbor}\n\
                 Interface: {}, Port ID (outgoing port): GigabitEthernet1/0/52",
                long_name(port)
            ),
        )
    }

    fn port_addresses(self, port: &str, count: usize) -> Self {
        let rows: Vec<String> = (0..count)
            .map(|i| format!("  10    0050.56aa.{i:04x}    DYNAMIC     {port}"))
            .collect();
        self.respond(
            &format!("show mac address-table interface {}", long_name(port)),
            &rows.join("\n"),
        )
    }
}
