//! Shared types for `switchtrace`.
//!
//! Everything the resolution core, the text parsers and the command line agree
//! on lives here: the data model, the runtime [`config::Config`], the error
//! taxonomy and the logging macros.

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod vendors;

#[doc(hidden)]
pub use tracing;
