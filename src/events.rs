//! Keyboard handling for the terminal dashboard.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{deadline_after, Pacer, StopSignal, WaitOutcome};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// `q`, `Esc` or `Ctrl-C`.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Waits on terminal events instead of sleeping.
///
/// Quit keys set the shared [`StopSignal`]; a resize asks the loop to
/// redraw the current batch.
#[derive(Debug, Clone, Default)]
pub struct KeyboardPacer {
    stop: StopSignal,
}

impl KeyboardPacer {
    pub fn new(stop: StopSignal) -> Self {
        Self { stop }
    }

    fn handle(&self, event: Event) -> Option<WaitOutcome> {
        match event {
            Event::Key(key) if is_quit_key(&key) => {
                self.stop.request();
                Some(WaitOutcome::Interrupted)
            }
            Event::Resize(_, _) => Some(WaitOutcome::Redraw),
            _ => None,
        }
    }
}

impl Pacer for KeyboardPacer {
    fn wait(&mut self, timeout: Duration) -> Result<WaitOutcome> {
        let deadline = deadline_after(timeout);
        loop {
            if self.stop.is_requested() {
                return Ok(WaitOutcome::Interrupted);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(WaitOutcome::Elapsed);
            }
            if let Some(event) = poll_event(remaining)? {
                if let Some(outcome) = self.handle(event) {
                    return Ok(outcome);
                }
            }
        }
    }

    fn interrupted(&mut self) -> bool {
        // Drain queued keys without blocking; resizes are picked up by the next draw
        while let Ok(Some(event)) = poll_event(Duration::ZERO) {
            self.handle(event);
        }
        self.stop.is_requested()
    }
}
