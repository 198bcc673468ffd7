//! Ranking of MAC sightings.
//!
//! A host's address shows up on its access port and again on every trunk
//! between that port and the device that was asked. The score separates the
//! two: edge ports are rewarded, anything that looks like an uplink (trunk
//! mode, a neighbor behind it, many learned addresses, aggregate or
//! high-speed naming) is penalized.

use std::cmp::Ordering;

use switchtrace_common::config::ScoreWeights;
use switchtrace_common::model::{PortCandidate, VlanId};
use switchtrace_protocols::interface::is_uplink_name;

pub fn score(candidate: &PortCandidate, weights: &ScoreWeights, vlan_of_interest: Option<VlanId>) -> i32 {
    let port = &candidate.characterization;
    let mut total = 0;

    total += if port.is_access && !port.is_trunk {
        weights.access_mode
    } else {
        -weights.access_mode
    };

    if port.has_neighbor {
        total -= weights.neighbor_penalty;
    }

    total += match port.mac_count {
        Some(n) if n >= weights.crowded_threshold => -weights.crowded_penalty,
        Some(n) if n >= weights.busy_threshold => -weights.busy_penalty,
        _ => weights.quiet_bonus,
    };

    if let Some(wanted) = vlan_of_interest {
        if candidate.vlan_id == Some(wanted) || port.access_vlan == Some(wanted) {
            total += weights.vlan_match_bonus;
        }
    }

    if is_uplink_name(candidate.interface.as_str()) {
        total -= weights.uplink_penalty;
    }

    total
}

/// Highest score first; equal scores keep registry order.
fn rank(a: &PortCandidate, b: &PortCandidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.registry_index.cmp(&b.registry_index))
}

/// Scores every candidate and returns the winner.
///
/// The result does not depend on the order `candidates` arrived in: ties are
/// broken by registry index alone.
pub fn select_best(
    candidates: Vec<PortCandidate>,
    weights: &ScoreWeights,
    vlan_of_interest: Option<VlanId>,
) -> Option<PortCandidate> {
    candidates
        .into_iter()
        .map(|mut candidate| {
            candidate.score = score(&candidate, weights, vlan_of_interest);
            candidate
        })
        .min_by(rank)
}
