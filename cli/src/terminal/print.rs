//! Report output. Every line goes through [`print`] so that it shares the
//! indicatif-aware writer with the log lines and never tears the spinner.

use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;
use crate::terminal::format::Detail;
use crate::terminal::logging::PRINT_TARGET;

pub const TOTAL_WIDTH: usize = 64;

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

/// `title` centered on a line of `fill`.
fn centered(title: &str, fill: &str) -> (String, String) {
    let pad = TOTAL_WIDTH.saturating_sub(UnicodeWidthStr::width(title));
    let left = pad / 2;
    (fill.repeat(left), fill.repeat(pad - left))
}

pub fn banner(q_level: u8) {
    if q_level > 0 {
        return;
    }

    let title = format!(" switchtrace {} · ip ─▸ port ", env!("CARGO_PKG_VERSION"));
    let (left, right) = centered(&title, "═");
    print(&format!(
        "{}{}{}",
        left.color(colors::SEPARATOR),
        title.color(colors::PRIMARY).bold(),
        right.color(colors::SEPARATOR)
    ));
}

/// Starts a report section. Suppressed in quiet mode.
pub fn section(title: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let title = format!("⟦ {} ⟧", title.to_uppercase());
    let (left, right) = centered(&title, "─");
    print(&format!(
        "{}{}{}",
        left.color(colors::SEPARATOR),
        title.bright_green(),
        right.color(colors::SEPARATOR)
    ));
}

pub fn note<T: AsRef<str>>(msg: T) {
    print(&format!(
        "{} {}",
        ">".color(colors::SEPARATOR),
        msg.as_ref().color(colors::TEXT_DEFAULT)
    ));
}

/// `key.....: value`, with the dots padding every key to `key_width`.
pub fn field<T: AsRef<str>>(key: &str, value: T, key_width: usize) {
    let dots = ".".repeat((key_width + 1).saturating_sub(key.len()));
    note(format!(
        "{}{}{} {}",
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value.as_ref()
    ));
}

/// Numbered list entry, e.g. a registry device.
pub fn entry(idx: usize, name: &str) {
    print(&format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    ));
}

/// The answer of a search: which device, which port.
pub fn port_path(device: &str, interface: &str) {
    print(&format!(
        "{} {} {}",
        device.color(colors::PRIMARY).bold(),
        "─▸".color(colors::SEPARATOR),
        interface.color(colors::PORT).bold()
    ));
}

/// One level of `├─ key...: value` lines under an [`entry`] or a
/// [`port_path`].
pub fn details(rows: &[Detail]) {
    let key_width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    for (i, (key, value)) in rows.iter().enumerate() {
        let branch = if i + 1 == rows.len() { "└─" } else { "├─" };
        let dots = ".".repeat(key_width.saturating_sub(key.len()) + 1);
        print(&format!(
            " {} {}{}{} {}",
            branch.color(colors::SEPARATOR),
            key.color(colors::TEXT_DEFAULT),
            dots.color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        ));
    }
}

/// Marks a search that ended without a port.
pub fn not_located(reason: &str) {
    print(&format!(
        "{} {}",
        "✗ not located".color(colors::BAD).bold(),
        reason.color(colors::TEXT_DEFAULT)
    ));
}

/// Closing line of a search, centered under a double rule.
pub fn summary(msg: &str) {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
    let pad = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{pad}{msg}"));
}

pub fn end_of_program() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}
