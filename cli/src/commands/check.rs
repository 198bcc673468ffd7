use std::path::Path;

use colored::*;

use crate::inventory::{Inventory, Settings};
use crate::mprint;
use crate::terminal::{colors, format::Detail, print};
use switchtrace_common::model::DeviceDescriptor;
use switchtrace_common::success;

pub fn check(path: &Path, q_level: u8) -> anyhow::Result<()> {
    let (settings, registry) = Inventory::load(path)?.into_parts()?;

    print::section("inventory", q_level);
    for (idx, device) in registry.iter().enumerate() {
        print::entry(idx, &device.name);
        print::details(&device_details(device));
        if idx + 1 != registry.len() {
            mprint!();
        }
    }

    if settings != Settings::default() {
        mprint!();
        print::section("settings", q_level);
        let key_width = "physical_port_limit".len();
        if let Some(vlan) = settings.vlan_of_interest {
            print::field("vlan_of_interest", vlan.to_string(), key_width);
        }
        if let Some(limit) = settings.physical_port_limit {
            print::field("physical_port_limit", limit.to_string(), key_width);
        }
        if let Some(secs) = settings.command_timeout {
            print::field("command_timeout", format!("{secs}s"), key_width);
        }
        if let Some(parallel) = settings.parallel {
            print::field("parallel", parallel.to_string(), key_width);
        }
        if settings.prime_arp {
            print::field("prime_arp", "yes", key_width);
        }
    }

    mprint!();
    success!("{} is valid: {} devices", path.display(), registry.len());
    Ok(())
}

fn device_details(device: &DeviceDescriptor) -> Vec<Detail> {
    vec![
        (
            "Address".to_string(),
            format!("{}:{}", device.address, device.port).color(colors::IPV4_ADDR),
        ),
        ("Type".to_string(), device.device_type.to_string().normal()),
        (
            "User".to_string(),
            device.credentials.username.as_str().color(colors::PRIMARY),
        ),
        (
            "Enable".to_string(),
            match device.secret {
                Some(_) => "secret set".color(colors::GOOD),
                None => "none".dimmed(),
            },
        ),
    ]
}
