//! The device session **abstraction**.
//!
//! The resolution stages only ever talk to a [`DeviceSession`]; how it is
//! established (telnet, a replayed capture, an SSH bridge) is the business of
//! the [`SessionFactory`] handed to the orchestrator.

use std::time::Duration;

use async_trait::async_trait;
use switchtrace_common::error::SessionError;
use switchtrace_common::model::DeviceDescriptor;
use tracing::debug;

pub mod scripted;
pub mod telnet;

/// An open command session on one device.
#[async_trait]
pub trait DeviceSession: Send {
    /// Runs `command` and returns its output.
    ///
    /// Implementations wait at most `timeout` and then return whatever output
    /// has arrived.
    async fn execute(&mut self, command: &str, timeout: Duration) -> Result<String, SessionError>;

    /// Releases the session. Calling it more than once is harmless.
    async fn close(&mut self);
}

/// Opens sessions to registry devices.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, device: &DeviceDescriptor) -> Result<Box<dyn DeviceSession>, SessionError>;
}

/// Outcome of one probe: a command, or a whole discovery source.
#[derive(Debug)]
pub enum Attempt<T> {
    Found(T),
    /// Ran fine but produced nothing usable.
    Empty,
    Failed(SessionError),
}

/// Runs one command, folding its result into an [`Attempt`].
///
/// Every command the stages issue goes through here, so this is the one place
/// command-level outcomes are logged.
pub async fn run(
    session: &mut dyn DeviceSession,
    device: &str,
    command: &str,
    budget: Duration,
) -> Attempt<String> {
    match session.execute(command, budget).await {
        Ok(output) if output.trim().is_empty() => {
            debug!(device, command, "empty output");
            Attempt::Empty
        }
        Ok(output) => {
            debug!(device, command, lines = output.lines().count(), "output received");
            Attempt::Found(output)
        }
        Err(e) => {
            debug!(device, command, error = %e, "command failed");
            Attempt::Failed(e)
        }
    }
}
