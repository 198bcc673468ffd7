pub mod check;
pub mod info;
pub mod locate;

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use switchtrace_common::config::Config;
use switchtrace_common::error::ConfigError;
use switchtrace_common::model::VlanId;

use crate::inventory::Settings;

#[derive(Parser)]
#[command(name = "switchtrace")]
#[command(version, about = "Finds the switch port an IP address is connected to.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Device inventory (YAML)
    #[arg(short, long, global = true, default_value = "inventory.yaml")]
    pub inventory: PathBuf,

    /// VLAN the host is expected in; sightings in it rank higher
    #[arg(long, global = true)]
    pub vlan: Option<VlanId>,

    /// Highest port index still treated as a physical access port
    #[arg(long, global = true)]
    pub port_limit: Option<u32>,

    /// Per-command wait budget in seconds
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Devices probed at once while locating the port
    #[arg(short, long, global = true)]
    pub parallel: Option<usize>,

    /// Ping the target from each device before the IP→MAC lookup
    #[arg(long, global = true)]
    pub prime_arp: bool,

    /// Skip the OUI vendor lookup
    #[arg(long, global = true)]
    pub no_vendor: bool,

    /// Less output (-q: results only, -qq: a single line)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// More log output (-v: per-command detail, -vv: everything)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Locate the switch port of an IP address
    #[command(alias = "l")]
    Locate { ip: IpAddr },
    /// Validate an inventory file and list its devices
    #[command(alias = "c")]
    Check { inventory: PathBuf },
    /// Show what the tool does and how it ranks ports
    #[command(alias = "i")]
    Info,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds the runtime configuration. Flags win over the inventory's
    /// `settings:` block, which wins over the defaults.
    pub fn config(&self, settings: &Settings) -> Result<Config, ConfigError> {
        let mut cfg = Config::default();

        cfg.vlan_of_interest = self.vlan.or(settings.vlan_of_interest);
        if let Some(limit) = self.port_limit.or(settings.physical_port_limit) {
            if limit == 0 {
                return Err(ConfigError::InvalidPortLimit);
            }
            cfg.physical_port_limit = limit;
        }
        if let Some(secs) = self.timeout.or(settings.command_timeout) {
            cfg.command_timeout = Duration::from_secs(secs);
        }
        if let Some(parallel) = self.parallel.or(settings.parallel) {
            cfg.stage2_concurrency = parallel.max(1);
        }
        cfg.prime_arp = self.prime_arp || settings.prime_arp;
        cfg.no_vendor = self.no_vendor;
        cfg.quiet = self.quiet;

        Ok(cfg)
    }
}
