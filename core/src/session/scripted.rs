//! Sessions that answer from canned command output.
//!
//! Used to replay captures taken from real devices and to drive the stages in
//! tests. Commands without a canned answer return empty output, the same way a
//! device answers a command it does not support once the error banner is
//! stripped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use switchtrace_common::error::SessionError;
use switchtrace_common::model::DeviceDescriptor;

use super::{DeviceSession, SessionFactory};

#[derive(Debug, Clone, Default)]
pub struct DeviceScript {
    responses: HashMap<String, Result<String, String>>,
    unreachable: bool,
}

impl DeviceScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device whose session can never be opened.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn respond(mut self, command: &str, output: &str) -> Self {
        self.responses
            .insert(command.to_string(), Ok(output.to_string()));
        self
    }

    /// Makes `command` fail with a command error.
    pub fn fail(mut self, command: &str, reason: &str) -> Self {
        self.responses
            .insert(command.to_string(), Err(reason.to_string()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    pub device: String,
    pub command: String,
}

#[derive(Debug, Default)]
struct Journal {
    commands: Mutex<Vec<CommandRecord>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Hands out [`ScriptedSession`]s by device name and keeps a journal of every
/// command issued.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFactory {
    scripts: HashMap<String, DeviceScript>,
    journal: Arc<Journal>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, name: &str, script: DeviceScript) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    /// Commands sent to `device`, in order.
    pub fn commands_for(&self, device: &str) -> Vec<String> {
        self.journal
            .commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|record| record.device == device)
            .map(|record| record.command.clone())
            .collect()
    }

    pub fn opened(&self) -> usize {
        self.journal.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.journal.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for ScriptedFactory {
    async fn open(&self, device: &DeviceDescriptor) -> Result<Box<dyn DeviceSession>, SessionError> {
        let script = match self.scripts.get(&device.name) {
            Some(script) if !script.unreachable => script.clone(),
            _ => {
                return Err(SessionError::Connection {
                    device: device.name.clone(),
                    reason: "host unreachable".to_string(),
                });
            }
        };

        self.journal.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            device: device.name.clone(),
            script,
            journal: self.journal.clone(),
            closed: false,
        }))
    }
}

pub struct ScriptedSession {
    device: String,
    script: DeviceScript,
    journal: Arc<Journal>,
    closed: bool,
}

#[async_trait]
impl DeviceSession for ScriptedSession {
    async fn execute(&mut self, command: &str, _timeout: Duration) -> Result<String, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }

        self.journal
            .commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(CommandRecord {
                device: self.device.clone(),
                command: command.to_string(),
            });

        match self.script.responses.get(command) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(reason)) => Err(SessionError::Command {
                command: command.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(String::new()),
        }
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.journal.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_commands_return_empty_output() {
        let factory = ScriptedFactory::new().with_device("SW1", DeviceScript::new());
        let device = DeviceDescriptor::new("SW1", "10.0.0.1", "u", "p");
        let mut session = factory.open(&device).await.unwrap();
        let output = session.execute("show clock", Duration::from_secs(1)).await.unwrap();
        assert!(output.is_empty());
        assert_eq!(factory.commands_for("SW1"), vec!["show clock".to_string()]);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let factory = ScriptedFactory::new().with_device("SW1", DeviceScript::new());
        let device = DeviceDescriptor::new("SW1", "10.0.0.1", "u", "p");
        let mut session = factory.open(&device).await.unwrap();
        session.close().await;
        session.close().await;
        assert_eq!(factory.closed(), 1);
        assert!(session.execute("show clock", Duration::from_secs(1)).await.is_err());
    }

    #[tokio::test]
    async fn unscripted_devices_are_unreachable() {
        let factory = ScriptedFactory::new().with_device("SW2", DeviceScript::unreachable());
        let missing = DeviceDescriptor::new("SW1", "10.0.0.1", "u", "p");
        let down = DeviceDescriptor::new("SW2", "10.0.0.2", "u", "p");
        assert!(matches!(factory.open(&missing).await, Err(SessionError::Connection { .. })));
        assert!(matches!(factory.open(&down).await, Err(SessionError::Connection { .. })));
        assert_eq!(factory.opened(), 0);
    }
}
