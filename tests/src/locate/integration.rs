use switchtrace_common::model::{Confidence, LocateOutcome, ResolutionSource, Stage};
use switchtrace_core::session::scripted::{DeviceScript, ScriptedFactory};

use crate::util::{self, SwitchScript, address_lookup, hinted_lookup, run, vlan};

/// X is the distribution switch: it answers ARP for the host and sees the MAC
/// on its trunk towards Y. Y is the access switch the host is plugged into.
fn distribution_and_access() -> ScriptedFactory {
    let x = DeviceScript::new()
        .knows_target_in_arp()
        .learned_on(&address_lookup(), 1, "Gi1/0/1")
        .trunk_port("Gi1/0/1")
        .cdp_neighbor("Gi1/0/1", "access-y")
        .port_addresses("Gi1/0/1", 10);

    let y = DeviceScript::new()
        .learned_on(&hinted_lookup(10), 10, "Gi1/0/5")
        .access_port("Gi1/0/5", 10)
        .port_addresses("Gi1/0/5", 1);

    ScriptedFactory::new().with_device("X", x).with_device("Y", y)
}

#[tokio::test]
async fn access_port_beats_trunk_sighting() {
    let factory = distribution_and_access();

    let outcome = run(&["X", "Y"], &factory, util::config(Some(10), 1)).await;

    let LocateOutcome::Located { result, failures } = outcome else {
        panic!("host was not located: {outcome:?}");
    };
    assert!(failures.is_empty());
    assert_eq!(result.device, "Y");
    assert_eq!(result.interface.as_str(), "GigabitEthernet1/0/5");
    assert_eq!(result.vlan, Some(vlan(10)));
    assert_eq!(result.score, 78);
    assert_eq!(result.confidence, Confidence::Dynamic);
    assert_eq!(result.source, ResolutionSource::Arp);
    assert_eq!(factory.opened(), factory.closed());
}

#[tokio::test]
async fn trunk_sighting_scores_as_uplink() -> anyhow::Result<()> {
    let factory = distribution_and_access();
    let cfg = util::config(Some(10), 1);

    let outcome = run(&["X"], &factory, cfg).await;

    let result = outcome
        .location()
        .ok_or_else(|| anyhow::anyhow!("X alone should still yield a location"))?;
    assert_eq!(result.device, "X");
    assert_eq!(result.interface.as_str(), "GigabitEthernet1/0/1");
    assert_eq!(result.score, -115);
    Ok(())
}

#[tokio::test]
async fn parallel_probing_selects_the_same_port() {
    let factory = distribution_and_access();

    let outcome = run(&["X", "Y"], &factory, util::config(Some(10), 4)).await;

    let result = outcome.location().unwrap();
    assert_eq!(result.device, "Y");
    assert_eq!(result.score, 78);
    assert_eq!(factory.opened(), factory.closed());
}

fn twin_access_switches() -> ScriptedFactory {
    let access = |port: &str| {
        DeviceScript::new()
            .learned_on(&hinted_lookup(10), 10, port)
            .access_port(port, 10)
            .port_addresses(port, 1)
    };
    ScriptedFactory::new()
        .with_device("core", DeviceScript::new().knows_target_in_arp())
        .with_device("B", access("Gi1/0/7"))
        .with_device("C", access("Gi1/0/9"))
}

#[tokio::test]
async fn equal_scores_follow_registry_order() {
    for parallel in [1, 2, 8] {
        let factory = twin_access_switches();
        let outcome = run(&["core", "B", "C"], &factory, util::config(None, parallel)).await;
        assert_eq!(outcome.location().unwrap().device, "B", "parallel = {parallel}");

        let factory = twin_access_switches();
        let outcome = run(&["core", "C", "B"], &factory, util::config(None, parallel)).await;
        assert_eq!(outcome.location().unwrap().device, "C", "parallel = {parallel}");
    }
}

#[tokio::test]
async fn stage_one_short_circuits_registry() {
    let factory = ScriptedFactory::new()
        .with_device("A", DeviceScript::new())
        .with_device("B", DeviceScript::new().knows_target_in_arp())
        .with_device("C", DeviceScript::new().knows_target_in_arp());

    let outcome = run(&["A", "B", "C"], &factory, util::config(None, 1)).await;

    let LocateOutcome::MacNotInTables { resolution, failures } = outcome else {
        panic!("expected MAC-not-in-tables, got {outcome:?}");
    };
    assert_eq!(resolution.origin_device, "B");
    assert!(failures.is_empty());

    // C is only visited by the MAC table scan.
    let c = factory.commands_for("C");
    assert!(!c.is_empty());
    assert!(c.iter().all(|command| command.starts_with("show mac address-table")));

    // B answered through targeted ARP, so the later sources never ran there.
    let b = factory.commands_for("B");
    assert!(!b.iter().any(|command| command == "show ip arp" || command.contains("tracking")));
}

#[tokio::test]
async fn unresolvable_ip_reports_every_unreachable_device() {
    let factory = ScriptedFactory::new()
        .with_device("A", DeviceScript::unreachable())
        .with_device("B", DeviceScript::new())
        .with_device("C", DeviceScript::unreachable());

    let outcome = run(&["A", "B", "C"], &factory, util::config(None, 1)).await;

    let LocateOutcome::MacUnresolved { ip, failures } = outcome else {
        panic!("expected unresolved, got {outcome:?}");
    };
    assert_eq!(ip, util::target());
    let failed: Vec<&str> = failures.iter().map(|f| f.device.as_str()).collect();
    assert_eq!(failed, ["A", "C"]);
    assert!(failures.iter().all(|f| f.stage == Stage::Resolve));
}

#[tokio::test]
async fn unreachable_device_in_stage_two_is_tolerated() {
    let factory = distribution_and_access().with_device("Z", DeviceScript::unreachable());

    for parallel in [1, 3] {
        let outcome = run(&["X", "Z", "Y"], &factory, util::config(Some(10), parallel)).await;

        assert_eq!(outcome.location().unwrap().device, "Y");
        let failures = outcome.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].device, "Z");
        // Stage one stopped at X before reaching Z.
        assert_eq!(failures[0].stage, Stage::Locate);
    }
}

#[tokio::test]
async fn member_port_wins_over_port_channel_row() {
    let edge = DeviceScript::new()
        .knows_target_in_arp()
        .respond(
            &hinted_lookup(10),
            &format!(
                "  10    {mac}    DYNAMIC     Po1\n  10    {mac}    DYNAMIC     Gi1/0/12",
                mac = util::MAC
            ),
        )
        .access_port("Gi1/0/12", 10);
    let factory = ScriptedFactory::new().with_device("edge", edge);

    let outcome = run(&["edge"], &factory, util::config(None, 1)).await;

    let result = outcome.location().unwrap();
    assert_eq!(result.interface.as_str(), "GigabitEthernet1/0/12");
    assert_eq!(result.confidence, Confidence::Dynamic);
}

#[tokio::test]
async fn sighting_without_vlan_is_characterized() {
    // The IP→MAC row carries no VLAN, so there is no hint either.
    let edge = DeviceScript::new()
        .respond(
            &format!("show ip arp {}", util::TARGET),
            &format!("Internet  {}  4  {}  ARPA", util::TARGET, util::MAC),
        )
        .respond(&address_lookup(), &format!("{}    DYNAMIC     Gi1/0/3", util::MAC))
        .access_port("Gi1/0/3", 10)
        .port_addresses("Gi1/0/3", 1);
    let factory = ScriptedFactory::new().with_device("edge", edge);

    let outcome = run(&["edge"], &factory, util::config(Some(10), 1)).await;

    let result = outcome.location().unwrap();
    assert_eq!(result.confidence, Confidence::Dynamic);
    assert_eq!(result.interface.as_str(), "GigabitEthernet1/0/3");
    // No VLAN column, so the port's access VLAN is reported.
    assert_eq!(result.vlan, Some(vlan(10)));
    assert!(result.characterization.is_access);
    assert_eq!(result.score, 78);
}

#[tokio::test]
async fn port_that_cannot_be_characterized_is_reported_unknown() {
    let port = "GigabitEthernet1/0/3";
    let edge = DeviceScript::new()
        .knows_target_in_arp()
        .learned_on(&hinted_lookup(10), 10, "Gi1/0/3")
        .fail(&format!("show interfaces {port} switchport"), "connection reset")
        .fail(&format!("show cdp neighbors interface {port} detail"), "connection reset")
        .fail(&format!("show lldp neighbors interface {port} detail"), "connection reset")
        .fail(&format!("show mac address-table interface {port}"), "connection reset");
    let factory = ScriptedFactory::new().with_device("edge", edge);

    let outcome = run(&["edge"], &factory, util::config(None, 1)).await;

    let result = outcome.location().unwrap();
    assert_eq!(result.confidence, Confidence::Unknown);
    assert_eq!(result.interface.as_str(), port);
    assert_eq!(result.vlan, Some(vlan(10)));
    assert!(!result.characterization.is_access);
}
