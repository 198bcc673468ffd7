//! # switchtrace core
//!
//! Finds the switch port an IP address lives behind.
//!
//! The search runs in two stages over an ordered [`DeviceRegistry`]:
//!
//! 1. **IP→MAC** ([`resolver`]): devices are asked in registry order until one
//!    of them can map the address to a hardware address.
//! 2. **MAC→port** ([`locator`]): every device is asked where it learned that
//!    address; each sighting is characterized ([`characterize`]) and ranked
//!    ([`scoring`]) so an access port beats the trunks the address also
//!    crosses.
//!
//! [`orchestrator::Orchestrator`] drives both stages. Device I/O goes through
//! the [`session::SessionFactory`] seam.
//!
//! [`DeviceRegistry`]: switchtrace_common::model::DeviceRegistry

pub mod characterize;
pub mod locator;
pub mod orchestrator;
pub mod resolver;
pub mod scoring;
pub mod session;
pub mod vendors;

pub use orchestrator::{CancellationFlag, Orchestrator, Phase, ProgressEvent, ProgressObserver};
