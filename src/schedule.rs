//! Re-render scheduling: debounce and last-result-wins supersession.
//!
//! Rapid successive option changes must collapse into a single render per
//! settling period (~300 ms of inactivity). [`Debounce`] is the state
//! machine for that: every trigger resets the deadline, and only the
//! trigger that survives untouched until the deadline fires. It is driven
//! by injected [`Instant`]s so the behavior is fully deterministic under
//! test; the interactive loop feeds it real clock readings.
//!
//! There is no hard cancellation for an in-flight render — it runs to
//! completion. Supersession is handled at the result side instead:
//! [`RenderSequencer`] tags every render invocation with a monotonic
//! ticket, and a completed result is only shown if its ticket is still the
//! most recently issued one. A stale result is simply discarded, which
//! gives "eventually consistent to latest inputs" without aborting any
//! computation.
//!
//! Inputs are snapshotted at trigger time (copy-on-trigger): the theme
//! name, resolved options, and settings a render works from are owned
//! copies, so a mutation arriving mid-render cannot alter them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Settling period for option-change debouncing.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(300);

/// Deadline-based debounce. Not a timer — the owner decides when to look
/// at the clock and calls [`Debounce::fire_if_settled`].
#[derive(Debug)]
pub struct Debounce {
    settle: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(settle: Duration) -> Self {
        Self { settle, deadline: None }
    }

    /// Register a change: the settle window restarts from `now`.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.settle);
    }

    /// Register a change that should not wait out the settle window —
    /// the next [`Debounce::fire_if_settled`] call fires immediately.
    pub fn trigger_now(&mut self, now: Instant) {
        self.deadline = Some(now);
    }

    /// True while a change is waiting for its window to expire.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time until the pending deadline, if any. Zero when already due.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Fire once when the window has expired. Returns `false` while still
    /// settling or when nothing is pending.
    pub fn fire_if_settled(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Identifier of one render invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket(u64);

/// Monotonic ticket issuer implementing "last result wins".
#[derive(Debug, Default)]
pub struct RenderSequencer {
    latest: AtomicU64,
}

impl RenderSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a new render. Every issue supersedes all earlier tickets.
    pub fn issue(&self) -> RenderTicket {
        RenderTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a completed render's result may be shown. A ticket issued
    /// before the latest one is stale and its result must be discarded.
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn debounce_fires_only_after_the_settle_window() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(300));

        debounce.trigger(t0);
        assert!(debounce.is_pending());
        assert!(!debounce.fire_if_settled(t0 + ms(100)));
        assert!(debounce.fire_if_settled(t0 + ms(300)));
        // Fired exactly once.
        assert!(!debounce.fire_if_settled(t0 + ms(400)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn each_trigger_resets_the_window() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(300));

        debounce.trigger(t0);
        debounce.trigger(t0 + ms(200));
        debounce.trigger(t0 + ms(400));

        // 300ms after the *first* trigger: still settling.
        assert!(!debounce.fire_if_settled(t0 + ms(300)));
        // 300ms after the last trigger: fires, once, for the whole burst.
        assert!(debounce.fire_if_settled(t0 + ms(700)));
        assert!(!debounce.fire_if_settled(t0 + ms(701)));
    }

    #[test]
    fn trigger_now_fires_without_waiting() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(300));
        debounce.trigger_now(t0);
        assert!(debounce.fire_if_settled(t0));
    }

    #[test]
    fn idle_debounce_never_fires() {
        let mut debounce = Debounce::new(ms(300));
        assert!(!debounce.fire_if_settled(Instant::now()));
        assert_eq!(debounce.time_remaining(Instant::now()), None);
    }

    #[test]
    fn time_remaining_counts_down_to_zero() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(300));
        debounce.trigger(t0);
        assert_eq!(debounce.time_remaining(t0 + ms(100)), Some(ms(200)));
        assert_eq!(debounce.time_remaining(t0 + ms(500)), Some(ms(0)));
    }

    #[test]
    fn only_the_latest_ticket_is_current() {
        let sequencer = RenderSequencer::new();
        let first = sequencer.issue();
        assert!(sequencer.is_current(first));

        let second = sequencer.issue();
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    #[test]
    fn stale_result_is_discarded_even_if_it_finishes_last() {
        let sequencer = RenderSequencer::new();
        let slow = sequencer.issue();
        let fast = sequencer.issue();

        // The slow render finishes after the fast one; completion order
        // does not matter, issue order does.
        assert!(sequencer.is_current(fast));
        assert!(!sequencer.is_current(slow));
    }
}
