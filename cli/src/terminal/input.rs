use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use switchtrace_common::warn;
use switchtrace_core::CancellationFlag;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Watches the keyboard for `q` or Ctrl-C and cancels the running search.
///
/// The search stops once the device currently being probed is done. Raw mode
/// is only entered when a user is attached to the terminal.
pub struct InputHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

fn is_interrupt(code: KeyCode, modifiers: KeyModifiers) -> bool {
    code == KeyCode::Char('q')
        || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL))
}

impl InputHandle {
    pub fn listen(cancel: CancellationFlag) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        if !console::user_attended() {
            return Self { stop, thread: None };
        }

        let stop_ref = stop.clone();
        let thread = thread::spawn(move || {
            if enable_raw_mode().is_err() {
                return;
            }
            while !stop_ref.load(Ordering::Relaxed) {
                if !event::poll(POLL_INTERVAL).unwrap_or(false) {
                    continue;
                }
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press && is_interrupt(key.code, key.modifiers) {
                        cancel.cancel();
                        warn!("Stopping after the current device...");
                        break;
                    }
                }
            }
            let _ = disable_raw_mode();
        });

        Self {
            stop,
            thread: Some(thread),
        }
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
            let _ = disable_raw_mode();
        }
    }
}
