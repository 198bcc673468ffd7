use std::time::Duration;

use crate::model::VlanId;

/// Runtime settings for one search.
///
/// Passed by value into the orchestrator; nothing in the resolution core reads
/// ambient state.
#[derive(Debug, Clone)]
pub struct Config {
    /// VLAN the operator expects the host to live in. Only the scoring engine
    /// reads it.
    pub vlan_of_interest: Option<VlanId>,

    /// Highest trailing port index still treated as a physical access port.
    pub physical_port_limit: u32,

    /// Wait budget for ordinary lookup commands.
    pub command_timeout: Duration,

    /// Wait budget for the port characterization commands.
    pub characterize_timeout: Duration,

    /// Wait budget for unfiltered table dumps (full ARP, VRF, tracking tables).
    pub scan_timeout: Duration,

    /// Upper bound for establishing a session.
    pub connect_timeout: Duration,

    /// Number of devices probed at once during MAC→port location.
    /// `1` keeps probing strictly sequential.
    pub stage2_concurrency: usize,

    /// Ping the target from each device before looking it up, so ARP entries
    /// exist for silent hosts.
    pub prime_arp: bool,

    /// Skips the OUI vendor lookup on the resolved MAC.
    pub no_vendor: bool,

    pub weights: ScoreWeights,

    /// Output verbosity of the terminal front end (0 = full).
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vlan_of_interest: None,
            physical_port_limit: 48,
            command_timeout: Duration::from_secs(20),
            characterize_timeout: Duration::from_secs(15),
            scan_timeout: Duration::from_secs(25),
            connect_timeout: Duration::from_secs(10),
            stage2_concurrency: 1,
            prime_arp: false,
            no_vendor: false,
            weights: ScoreWeights::default(),
            quiet: 0,
        }
    }
}

/// Additive weights used to rank MAC sightings.
///
/// The defaults were tuned on campus access/distribution layouts. Only their
/// relative ordering matters: an access port must outrank a trunk carrying the
/// same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    /// Added for an access port, subtracted for anything else.
    pub access_mode: i32,
    pub neighbor_penalty: i32,
    /// Penalty when at least `crowded_threshold` addresses share the port.
    pub crowded_penalty: i32,
    /// Penalty when at least `busy_threshold` addresses share the port.
    pub busy_penalty: i32,
    /// Bonus for a port with few (or unknown) learned addresses.
    pub quiet_bonus: i32,
    pub crowded_threshold: u32,
    pub busy_threshold: u32,
    pub vlan_match_bonus: i32,
    pub uplink_penalty: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            access_mode: 60,
            neighbor_penalty: 30,
            crowded_penalty: 25,
            busy_penalty: 12,
            quiet_bonus: 8,
            crowded_threshold: 8,
            busy_threshold: 3,
            vlan_match_bonus: 10,
            uplink_penalty: 40,
        }
    }
}
