//! Thin wrappers over `tracing` so every crate logs with the same targets.
//!
//! `success!` is an `INFO` event on the `switchtrace::success` target, which the
//! terminal formatter renders with its own symbol.

pub const SUCCESS_TARGET: &str = "switchtrace::success";

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: $crate::logging::SUCCESS_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}
