//! Drives a search across the device registry.
//!
//! Stage one walks the registry in order and stops at the first device that
//! maps the IP to a MAC. Stage two then asks *every* device where it learned
//! that MAC, because the host's access port only stands out once all of the
//! trunk sightings are known.

use std::fmt;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use switchtrace_common::config::Config;
use switchtrace_common::error::SessionError;
use switchtrace_common::model::{
    DeviceDescriptor, DeviceFailure, DeviceRegistry, IpMacResolution, LocateOutcome,
    LocationResult, MacAddress, PortCandidate, Stage, VlanId,
};
use switchtrace_common::vendors::VendorRepository;
use switchtrace_common::{info, success, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::session::{DeviceSession, SessionFactory};
use crate::{locator, resolver, scoring};

/// Where a search currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Stage1Scanning,
    /// No device could map the IP to a MAC.
    Stage1Failed,
    Stage1Succeeded,
    Stage2Scanning,
    /// The MAC is in no device's table.
    Stage2Failed,
    Located,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Stage1Failed | Phase::Stage2Failed | Phase::Located)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NotStarted => "not started",
            Phase::Stage1Scanning => "resolving ip→mac",
            Phase::Stage1Failed => "mac unresolved",
            Phase::Stage1Succeeded => "mac resolved",
            Phase::Stage2Scanning => "locating mac→port",
            Phase::Stage2Failed => "mac not in any table",
            Phase::Located => "located",
        };
        f.write_str(name)
    }
}

/// Progress notifications for front ends.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    PhaseChanged(Phase),
    DeviceStarted {
        stage: Stage,
        device: String,
        /// 1-based position in the registry.
        position: usize,
        total: usize,
    },
    MacResolved(IpMacResolution),
    Sighting(PortCandidate),
    DeviceFailed(DeviceFailure),
}

pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

/// Stops a search between two devices. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs the two-stage search for one IP at a time.
pub struct Orchestrator {
    registry: DeviceRegistry,
    config: Arc<Config>,
    sessions: Arc<dyn SessionFactory>,
    vendors: Option<Box<dyn VendorRepository>>,
    observer: Option<Arc<dyn ProgressObserver>>,
    cancel: CancellationFlag,
    phase: Mutex<Phase>,
}

impl Orchestrator {
    pub fn new(registry: DeviceRegistry, config: Config, sessions: Arc<dyn SessionFactory>) -> Self {
        Self {
            registry,
            config: Arc::new(config),
            sessions,
            vendors: None,
            observer: None,
            cancel: CancellationFlag::new(),
            phase: Mutex::new(Phase::NotStarted),
        }
    }

    pub fn with_vendor_repository(mut self, vendors: Box<dyn VendorRepository>) -> Self {
        self.vendors = Some(vendors);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Handle that cancels the running search once the current device is done.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Finds the switch port `ip` lives behind.
    ///
    /// Device failures never abort the search; they are collected into the
    /// outcome. Both "no MAC" and "MAC in no table" are ordinary outcomes.
    pub async fn locate(&self, ip: IpAddr) -> LocateOutcome {
        let mut failures = Vec::new();

        self.transition(Phase::Stage1Scanning);
        let Some(resolution) = self.resolve_mac(ip, &mut failures).await else {
            self.transition(Phase::Stage1Failed);
            return LocateOutcome::MacUnresolved { ip, failures };
        };

        success!(
            "{ip} is {} (via {} on {})",
            resolution.mac,
            resolution.source,
            resolution.origin_device
        );
        self.notify(ProgressEvent::MacResolved(resolution.clone()));
        self.transition(Phase::Stage1Succeeded);

        self.transition(Phase::Stage2Scanning);
        let candidates = self
            .collect_sightings(resolution.mac, resolution.vlan_id, &mut failures)
            .await;

        let best = scoring::select_best(
            candidates,
            &self.config.weights,
            self.config.vlan_of_interest,
        );
        let Some(best) = best else {
            self.transition(Phase::Stage2Failed);
            return LocateOutcome::MacNotInTables {
                resolution,
                failures,
            };
        };

        let mut result = LocationResult::from_candidate(best, &resolution);
        if !self.config.no_vendor {
            result.vendor = self
                .vendors
                .as_ref()
                .and_then(|repo| repo.get_vendor(&result.mac));
        }

        self.transition(Phase::Located);
        LocateOutcome::Located { result, failures }
    }

    /// Stage one: registry order, first success wins.
    async fn resolve_mac(&self, ip: IpAddr, failures: &mut Vec<DeviceFailure>) -> Option<IpMacResolution> {
        let total = self.registry.len();

        for (index, device) in self.registry.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("search cancelled before {}", device.name);
                return None;
            }

            self.notify(ProgressEvent::DeviceStarted {
                stage: Stage::Resolve,
                device: device.name.clone(),
                position: index + 1,
                total,
            });

            let mut session = match open_session(self.sessions.as_ref(), device, self.config.connect_timeout).await {
                Ok(session) => session,
                Err(e) => {
                    self.record_failure(failures, device, Stage::Resolve, &e);
                    continue;
                }
            };

            let found = resolver::resolve(session.as_mut(), &device.name, ip, &self.config).await;
            session.close().await;

            match found {
                Some(resolution) => return Some(resolution),
                None => debug!(device = %device.name, "no ip→mac binding"),
            }
        }

        None
    }

    /// Stage two: every device, optionally several at once.
    async fn collect_sightings(
        &self,
        mac: MacAddress,
        vlan_hint: Option<VlanId>,
        failures: &mut Vec<DeviceFailure>,
    ) -> Vec<PortCandidate> {
        let outcomes = if self.config.stage2_concurrency > 1 {
            self.sightings_concurrent(mac, vlan_hint).await
        } else {
            self.sightings_sequential(mac, vlan_hint).await
        };

        let mut candidates = Vec::new();
        for (index, outcome) in outcomes {
            let Some(device) = self.registry.get(index) else {
                continue;
            };
            match outcome {
                Ok(Some(candidate)) => {
                    self.notify(ProgressEvent::Sighting(candidate.clone()));
                    candidates.push(candidate);
                }
                Ok(None) => debug!(device = %device.name, "mac not in table"),
                Err(e) => self.record_failure(failures, device, Stage::Locate, &e),
            }
        }
        candidates
    }

    async fn sightings_sequential(
        &self,
        mac: MacAddress,
        vlan_hint: Option<VlanId>,
    ) -> Vec<(usize, Result<Option<PortCandidate>, SessionError>)> {
        let total = self.registry.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, device) in self.registry.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("search cancelled before {}, keeping sightings so far", device.name);
                break;
            }
            self.notify(ProgressEvent::DeviceStarted {
                stage: Stage::Locate,
                device: device.name.clone(),
                position: index + 1,
                total,
            });

            let outcome = probe_locate(
                self.sessions.as_ref(),
                device,
                index,
                &mac,
                vlan_hint,
                &self.config,
            )
            .await;
            outcomes.push((index, outcome));
        }

        outcomes
    }

    async fn sightings_concurrent(
        &self,
        mac: MacAddress,
        vlan_hint: Option<VlanId>,
    ) -> Vec<(usize, Result<Option<PortCandidate>, SessionError>)> {
        let total = self.registry.len();
        let permits = Arc::new(Semaphore::new(self.config.stage2_concurrency));
        let mut tasks = JoinSet::new();

        for (index, device) in self.registry.iter().enumerate() {
            let permits = permits.clone();
            let sessions = self.sessions.clone();
            let config = self.config.clone();
            let cancel = self.cancel.clone();
            let observer = self.observer.clone();
            let device = device.clone();

            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return None;
                };
                if cancel.is_cancelled() {
                    return None;
                }
                if let Some(observer) = &observer {
                    observer.on_event(&ProgressEvent::DeviceStarted {
                        stage: Stage::Locate,
                        device: device.name.clone(),
                        position: index + 1,
                        total,
                    });
                }
                let outcome =
                    probe_locate(sessions.as_ref(), &device, index, &mac, vlan_hint, &config).await;
                Some((index, outcome))
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(outcome)) => outcomes.push(outcome),
                Ok(None) => {}
                Err(e) => warn!("stage two task aborted: {e}"),
            }
        }
        if self.cancel.is_cancelled() {
            warn!("search cancelled, keeping {} sightings", outcomes.len());
        }

        // Arrival order is arbitrary; registry order keeps failures and
        // progress events reproducible.
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes
    }

    fn transition(&self, next: Phase) {
        *self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
        if next.is_terminal() {
            debug!(phase = %next, "search finished");
        } else {
            info!("{}", next);
        }
        self.notify(ProgressEvent::PhaseChanged(next));
    }

    fn record_failure(
        &self,
        failures: &mut Vec<DeviceFailure>,
        device: &DeviceDescriptor,
        stage: Stage,
        error: &SessionError,
    ) {
        warn!("{} skipped during {stage}: {error}", device.name);
        let failure = DeviceFailure {
            device: device.name.clone(),
            stage,
            reason: error.to_string(),
        };
        self.notify(ProgressEvent::DeviceFailed(failure.clone()));
        failures.push(failure);
    }

    fn notify(&self, event: ProgressEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }
}

async fn open_session(
    sessions: &dyn SessionFactory,
    device: &DeviceDescriptor,
    limit: Duration,
) -> Result<Box<dyn DeviceSession>, SessionError> {
    match tokio::time::timeout(limit, sessions.open(device)).await {
        Ok(opened) => opened,
        Err(_) => Err(SessionError::Timeout {
            device: device.name.clone(),
            seconds: limit.as_secs(),
        }),
    }
}

/// One device's stage-two probe. The session is closed before returning.
async fn probe_locate(
    sessions: &dyn SessionFactory,
    device: &DeviceDescriptor,
    index: usize,
    mac: &MacAddress,
    vlan_hint: Option<VlanId>,
    config: &Config,
) -> Result<Option<PortCandidate>, SessionError> {
    let mut session = open_session(sessions, device, config.connect_timeout).await?;
    let found = locator::locate(session.as_mut(), &device.name, index, mac, vlan_hint, config).await;
    session.close().await;
    Ok(found)
}
