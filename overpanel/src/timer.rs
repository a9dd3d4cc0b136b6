//! Logical-time timer queue.
//!
//! Nothing in the engine waits on a wall clock. Deferred work is scheduled
//! here with a delay relative to [`Timers::now`], and the host moves time
//! forward explicitly. Tests drive the same path without sleeping.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle of a scheduled timer, unique within one [`Timers`] queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deadline-ordered set of pending timers carrying a payload `K`.
#[derive(Debug)]
pub struct Timers<K> {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, TimerId), K>,
    deadlines: HashMap<TimerId, Duration>,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Timers<K> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current logical time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers that have not fired or been cancelled.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedule `key` to fire `delay` after the current logical time.
    pub fn schedule(&mut self, delay: Duration, key: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now.saturating_add(delay);
        self.pending.insert((deadline, id), key);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending timer. Returns `false` if it already fired.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let Some(deadline) = self.deadlines.remove(&id) else {
            return false;
        };
        self.pending.remove(&(deadline, id)).is_some()
    }

    /// Whether `id` is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest timer due at or before `until`.
    ///
    /// Logical time moves to the popped deadline, so work scheduled while
    /// handling the timer is relative to the moment it fired. Timers sharing
    /// a deadline fire in scheduling order.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, K)> {
        let (&(deadline, id), _) = self.pending.first_key_value()?;
        if deadline > until {
            return None;
        }
        let key = self.pending.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.advance_to(deadline);
        Some((id, key))
    }

    /// Move logical time forward. Time never moves backwards.
    pub fn advance_to(&mut self, at: Duration) {
        if at > self.now {
            self.now = at;
        }
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Timers;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn given_timers_when_popping_then_deadline_order_is_respected() {
        let mut timers = Timers::new();
        let _ = timers.schedule(ms(30), "late");
        let _ = timers.schedule(ms(10), "early");
        let _ = timers.schedule(ms(10), "early-second");

        let fired: Vec<_> = std::iter::from_fn(|| timers.pop_due(ms(100)))
            .map(|(_, key)| key)
            .collect();

        assert_eq!(fired, vec!["early", "early-second", "late"]);
        assert_eq!(timers.now(), ms(30));
    }

    #[test]
    fn given_future_timer_when_popping_early_then_nothing_fires() {
        let mut timers = Timers::new();
        let _ = timers.schedule(ms(50), ());

        assert!(timers.pop_due(ms(49)).is_none());
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_deadline(), Some(ms(50)));
    }

    #[test]
    fn given_cancelled_timer_when_popping_then_it_never_fires() {
        let mut timers = Timers::new();
        let id = timers.schedule(ms(5), "cancelled");

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.pop_due(ms(10)).is_none());
        assert!(timers.is_empty());
    }

    #[test]
    fn given_timer_fired_when_scheduling_then_delay_is_relative_to_fire_time()
    {
        let mut timers = Timers::new();
        let _ = timers.schedule(ms(10), 1);

        let (_, first) = timers.pop_due(ms(1000)).unwrap();
        let _ = timers.schedule(ms(20), first + 1);

        assert_eq!(timers.next_deadline(), Some(ms(30)));
    }

    #[test]
    fn given_time_advanced_when_moving_backwards_then_now_is_kept() {
        let mut timers: Timers<()> = Timers::new();

        timers.advance_to(ms(40));
        timers.advance_to(ms(10));

        assert_eq!(timers.now(), ms(40));
    }
}
