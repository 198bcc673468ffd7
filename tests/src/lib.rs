//! End-to-end searches against scripted devices.

#[cfg(test)]
mod locate;
#[cfg(test)]
mod util;
