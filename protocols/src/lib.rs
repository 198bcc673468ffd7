//! Parsers for the text and byte streams network devices hand back.
//!
//! Nothing in here performs I/O. Each function takes the output of one command
//! (or one line of it) and extracts a single fact, so every pattern can be
//! tested against captured device output.

pub mod interface;
pub mod patterns;
pub mod rows;
pub mod telnet;
