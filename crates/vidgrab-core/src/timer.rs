//! Timer system for vidgrab.
//!
//! Provides one-shot timers measured against a virtual clock.
//! The toolkit advances the clock from its event loop; headless runs and
//! tests advance it explicitly, so timer behavior is deterministic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};

use crate::error::TimerError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// An entry in the timer queue (min-heap by fire time, then by start order).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Duration,
    sequence: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.sequence == other.sequence
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Manages all timers of one toolkit instance.
#[derive(Debug, Default)]
pub struct TimerManager {
    timers: SlotMap<TimerId, Duration>,
    queue: BinaryHeap<TimerQueueEntry>,
    now: Duration,
    sequence: u64,
}

impl TimerManager {
    /// Create a new timer manager with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Start a one-shot timer that fires after `delay`.
    pub fn start_one_shot(&mut self, delay: Duration) -> TimerId {
        let fire_time = self.now + delay;
        let id = self.timers.insert(fire_time);
        self.push(id, fire_time);
        tracing::trace!(target: targets::TIMER, ?id, ?delay, "timer started");
        id
    }

    fn push(&mut self, id: TimerId, fire_time: Duration) {
        self.sequence += 1;
        self.queue.push(TimerQueueEntry {
            id,
            fire_time,
            sequence: self.sequence,
        });
    }

    /// Stop and remove a timer.
    pub fn stop(&mut self, id: TimerId) -> Result<(), TimerError> {
        self.timers
            .remove(id)
            .map(|_| ())
            .ok_or(TimerError::InvalidTimerId)
    }

    /// Cancel the timer held in `slot`, if any, and clear the slot.
    ///
    /// Calling this on an empty slot, or on a timer that already fired,
    /// does nothing.
    pub fn cancel(&mut self, slot: &mut Option<TimerId>) {
        if let Some(id) = slot.take()
            && self.stop(id).is_ok()
        {
            tracing::trace!(target: targets::TIMER, ?id, "timer cancelled");
        }
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the duration until the next timer fires, if any.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        while let Some(entry) = self.queue.peek() {
            if self.is_live(entry) {
                break;
            }
            self.queue.pop();
        }
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_sub(self.now))
    }

    fn is_live(&self, entry: &TimerQueueEntry) -> bool {
        self.timers
            .get(entry.id)
            .is_some_and(|&fire_time| fire_time == entry.fire_time)
    }

    /// Move the clock forward by `by` and return the timers that fired,
    /// in firing order.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        self.now += by;
        self.process_expired()
    }

    /// Collect and remove all timers due at the current time.
    #[tracing::instrument(skip(self), target = "vidgrab_core::timer", level = "trace")]
    pub fn process_expired(&mut self) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(&entry) = self.queue.peek() {
            if entry.fire_time > self.now {
                break;
            }
            self.queue.pop();

            if self.is_live(&entry) {
                self.timers.remove(entry.id);
                tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
                fired.push(entry.id);
            }
        }

        fired
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Duration::from_millis(100));

        assert!(timers.advance(Duration::from_millis(99)).is_empty());
        assert_eq!(timers.advance(Duration::from_millis(1)), vec![id]);
        assert!(!timers.is_active(id));
        assert!(timers.advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_time_until_next_skips_stopped() {
        let mut timers = TimerManager::new();
        let stopped = timers.start_one_shot(Duration::from_millis(10));
        timers.start_one_shot(Duration::from_millis(25));
        timers.stop(stopped).unwrap();

        timers.advance(Duration::from_millis(5));
        assert_eq!(timers.time_until_next(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_firing_order_is_deterministic() {
        let mut timers = TimerManager::new();
        let late = timers.start_one_shot(Duration::from_millis(20));
        let first = timers.start_one_shot(Duration::from_millis(10));
        let second = timers.start_one_shot(Duration::from_millis(10));

        assert_eq!(
            timers.advance(Duration::from_millis(30)),
            vec![first, second, late]
        );
    }

    #[test]
    fn test_stop_unknown_timer() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Duration::from_millis(5));
        timers.stop(id).unwrap();
        assert_eq!(timers.stop(id), Err(TimerError::InvalidTimerId));
        assert_eq!(timers.time_until_next(), None);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timers = TimerManager::new();
        let mut pending = Some(timers.start_one_shot(Duration::from_millis(5)));

        timers.cancel(&mut pending);
        assert!(pending.is_none());
        timers.cancel(&mut pending);
        assert_eq!(timers.active_count(), 0);
        assert!(timers.advance(Duration::from_millis(10)).is_empty());
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let mut timers = TimerManager::new();
        let mut pending = Some(timers.start_one_shot(Duration::from_millis(5)));
        timers.advance(Duration::from_millis(5));

        timers.cancel(&mut pending);
        assert!(pending.is_none());
    }
}
