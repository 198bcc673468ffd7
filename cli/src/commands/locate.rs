use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use tracing::{Instrument, info_span};

use crate::commands::CommandLine;
use crate::inventory::Inventory;
use crate::mprint;
use crate::terminal::{colors, format, input::InputHandle, print, spinner::SpinnerObserver};
use switchtrace_common::config::Config;
use switchtrace_common::model::{LocateOutcome, LocationResult};
use switchtrace_common::{success, warn};
use switchtrace_core::Orchestrator;
use switchtrace_core::session::telnet::TelnetSessionFactory;
use switchtrace_core::vendors::MacOuiRepo;

pub async fn locate(ip: IpAddr, args: &CommandLine) -> anyhow::Result<()> {
    let (settings, registry) = Inventory::load(&args.inventory)?.into_parts()?;
    let cfg: Config = args.config(&settings)?;

    success!(
        "Loaded {} devices from {}",
        registry.len(),
        args.inventory.display()
    );

    let sessions = Arc::new(TelnetSessionFactory::new(&cfg));
    let span = info_span!("locate", indicatif.pb_show = true);
    let orchestrator = Orchestrator::new(registry, cfg.clone(), sessions)
        .with_vendor_repository(Box::new(MacOuiRepo))
        .with_observer(Arc::new(SpinnerObserver::new(span.clone())));

    let input = InputHandle::listen(orchestrator.cancellation());
    let start_time = Instant::now();
    let outcome = orchestrator.locate(ip).instrument(span).await;
    drop(input);

    report(&outcome, start_time.elapsed(), &cfg);
    Ok(())
}

fn report(outcome: &LocateOutcome, total_time: Duration, cfg: &Config) {
    if cfg.quiet > 0 {
        mprint!();
    }

    match outcome {
        LocateOutcome::Located { result, .. } => located(result, cfg),
        LocateOutcome::MacUnresolved { ip, .. } => {
            print::section("mac unresolved", cfg.quiet);
            if cfg.quiet < 2 {
                print::not_located(&format!("no device could map {ip} to a MAC"));
            }
            warn!("No device could map {ip} to a MAC address");
        }
        LocateOutcome::MacNotInTables { resolution, .. } => {
            print::section("mac not in any table", cfg.quiet);
            if cfg.quiet < 2 {
                print::details(&format::resolution_details(resolution));
            }
            warn!(
                "{} is {}, but no device has it in its MAC address table",
                resolution.ip, resolution.mac
            );
        }
    }

    let failures = outcome.failures();
    if !failures.is_empty() && cfg.quiet < 2 {
        mprint!();
        print::section("unreachable devices", cfg.quiet);
        print::details(&format::failure_details(failures));
    }

    print_summary(outcome, total_time, cfg);
}

fn located(result: &LocationResult, cfg: &Config) {
    match cfg.quiet {
        2 => print::print(&format::one_line(result)),
        _ => {
            print::section("host located", cfg.quiet);
            print::port_path(&result.device, result.interface.as_str());
            print::details(&format::location_details(result));
        }
    }
}

fn print_summary(outcome: &LocateOutcome, total_time: Duration, cfg: &Config) {
    if cfg.quiet >= 2 {
        return;
    }

    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let verdict: ColoredString = match outcome.location() {
        Some(result) => format!("{} {}", result.device, result.interface)
            .bold()
            .green(),
        None => "not located".bold().red(),
    };
    let output: String = format!("Search complete: {verdict} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match cfg.quiet {
        0 => print::summary(&output),
        _ => {
            mprint!();
            success!("{}", output)
        }
    }
}
