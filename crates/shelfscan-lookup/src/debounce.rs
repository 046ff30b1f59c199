//! Scanner event gating.
//!
//! Camera scanners report the same code many times a second. A
//! [`ScanDebouncer`] lets one event through, then ignores everything until
//! the lookup it started has finished and the cooldown has elapsed.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct ScanDebouncer {
    cooldown: Duration,
    last_accepted: Option<Instant>,
    busy: bool,
}

impl ScanDebouncer {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: None,
            busy: false,
        }
    }

    /// Decides whether a scanner event at `now` should start a lookup.
    ///
    /// Blank events are always rejected. An accepted event marks the
    /// debouncer busy until [`ScanDebouncer::finish`] is called.
    pub fn accept(&mut self, raw: &str, now: Instant) -> bool {
        if raw.trim().is_empty() || self.busy {
            return false;
        }
        if let Some(last) = self.last_accepted {
            if now.saturating_duration_since(last) < self.cooldown {
                tracing::trace!("scan ignored inside cooldown");
                return false;
            }
        }
        self.last_accepted = Some(now);
        self.busy = true;
        true
    }

    /// Marks the lookup started by the last accepted event as finished.
    pub fn finish(&mut self) {
        self.busy = false;
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }
}
