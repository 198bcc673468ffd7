use thiserror::Error;

/// Failures raised by a device session.
///
/// The resolution core never propagates these past a single device: a
/// connection failure removes the device from the search, a command failure is
/// read as empty output.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("connection to {device} failed: {reason}")]
    Connection { device: String, reason: String },

    #[error("authentication rejected by {0}")]
    Authentication(String),

    #[error("command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("{device} did not answer within {seconds}s")]
    Timeout { device: String, seconds: u64 },

    #[error("session already closed")]
    Closed,

    #[error("lost track of the prompt on {0}")]
    Desynchronized(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacParseError {
    #[error("`{0}` does not reduce to exactly 12 hex digits")]
    InvalidLength(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VlanParseError {
    #[error("`{0}` is not a VLAN id (1-4094)")]
    OutOfRange(String),
}

/// Problems with the static input of a search (registry, settings).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("the device registry is empty")]
    EmptyRegistry,

    #[error("device `{0}` appears more than once in the registry")]
    DuplicateDevice(String),

    #[error("device `{0}` has no address")]
    MissingAddress(String),

    #[error("physical port limit must be at least 1")]
    InvalidPortLimit,
}
