use colored::*;
use indicatif::ProgressStyle;
use switchtrace_common::model::Stage;
use switchtrace_core::{Phase, ProgressEvent, ProgressObserver};
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

/// Mirrors search progress onto the progress bar attached to `span`.
pub struct SpinnerObserver {
    span: Span,
}

impl SpinnerObserver {
    pub fn new(span: Span) -> Self {
        span.pb_set_style(&spinner_style());
        span.pb_set_message(&format!("{}", "You can press 'q' to stop early".italic().white()));
        Self { span }
    }
}

fn stage_verb(stage: Stage) -> &'static str {
    match stage {
        Stage::Resolve => "Resolving MAC on",
        Stage::Locate => "Searching tables on",
    }
}

pub fn describe(event: &ProgressEvent) -> Option<String> {
    let message = match event {
        ProgressEvent::DeviceStarted {
            stage,
            device,
            position,
            total,
        } => format!(
            "[{position}/{total}] {} {}...",
            stage_verb(*stage),
            device.color(colors::PRIMARY).bold()
        ),
        ProgressEvent::MacResolved(resolution) => format!(
            "Found {}, looking for its port...",
            resolution.mac.to_string().color(colors::MAC_ADDR).bold()
        ),
        ProgressEvent::Sighting(candidate) => format!(
            "Seen on {} {}",
            candidate.device.color(colors::PRIMARY),
            candidate.interface.as_str().color(colors::PORT)
        ),
        ProgressEvent::PhaseChanged(Phase::Stage2Scanning) => "Collecting sightings...".to_string(),
        ProgressEvent::PhaseChanged(_) | ProgressEvent::DeviceFailed(_) => return None,
    };
    Some(message)
}

impl ProgressObserver for SpinnerObserver {
    fn on_event(&self, event: &ProgressEvent) {
        if let Some(message) = describe(event) {
            self.span.pb_set_message(&message);
        }
    }
}
