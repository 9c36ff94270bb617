//! Deterministic clock driven by explicit time advances.

use std::time::Duration;

use star_forge_core::{Clock, Timer};

/// Clock that queues timers and releases them when simulated time passes their deadline.
///
/// Hosts call [`ManualClock::advance`] and hand each returned timer to the
/// controller. Timers due at the same instant are released in arming order.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Duration,
    pending: Vec<PendingTimer>,
}

#[derive(Clone, Copy, Debug)]
struct PendingTimer {
    due: Duration,
    timer: Timer,
}

impl ManualClock {
    /// Creates a clock at time zero with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated time elapsed so far.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers that have not fired yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Moves time forward by `dt` and returns every timer that became due.
    pub fn advance(&mut self, dt: Duration) -> Vec<Timer> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;
        let mut due: Vec<PendingTimer> = Vec::new();
        self.pending.retain(|pending| {
            if pending.due <= now {
                due.push(*pending);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|pending| pending.due);
        due.into_iter().map(|pending| pending.timer).collect()
    }

    /// Jumps to the latest deadline and returns every pending timer.
    pub fn advance_to_end(&mut self) -> Vec<Timer> {
        let latest = self
            .pending
            .iter()
            .map(|pending| pending.due)
            .max()
            .unwrap_or(self.now);
        self.advance(latest.saturating_sub(self.now))
    }
}

impl Clock for ManualClock {
    fn after(&mut self, delay: Duration, timer: Timer) {
        self.pending.push(PendingTimer {
            due: self.now.saturating_add(delay),
            timer,
        });
    }
}
