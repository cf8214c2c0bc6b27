#![forbid(unsafe_code)]

//! One-shot timers for the single-threaded event loop.
//!
//! Timers are plain entries in a [`TimerQueue`] owned by whoever runs the
//! loop. There are no timer threads: the loop asks for the
//! [`next_deadline`](TimerQueue::next_deadline), sleeps in its input poll at
//! most that long, then pops whatever is due. Cancelling removes the entry,
//! so a cancelled timer can never deliver its message.
//!
//! Time is a [`Duration`] since an arbitrary origin chosen by the owner: the
//! program uses wall-clock time since start, the simulator a virtual clock.

use std::fmt;
use std::time::Duration;

/// Caller-chosen timer identity.
///
/// Scheduling with an id that is already pending replaces that timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

struct PendingTimer<M> {
    id: TimerId,
    deadline: Duration,
    /// Insertion order, used to break deadline ties.
    seq: u64,
    msg: M,
}

/// Pending one-shot timers ordered by deadline.
pub struct TimerQueue<M> {
    entries: Vec<PendingTimer<M>>,
    next_seq: u64,
}

impl<M> Default for TimerQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for TimerQueue<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.ids())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

impl<M> TimerQueue<M> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` is pending.
    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Ids of pending timers in firing order.
    pub fn ids(&self) -> Vec<TimerId> {
        let mut order: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.deadline, entry.seq, entry.id))
            .collect();
        order.sort_unstable();
        order.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Arm `id` to deliver `msg` at `now + delay`.
    ///
    /// Returns `true` if a pending timer with the same id was replaced.
    pub fn schedule(&mut self, id: TimerId, now: Duration, delay: Duration, msg: M) -> bool {
        let replaced = self.cancel(id);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(PendingTimer {
            id,
            deadline: now.saturating_add(delay),
            seq,
            msg,
        });
        replaced
    }

    /// Drop the pending timer `id`. Returns `true` if one was pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Drop every pending timer, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// Time from `now` until the earliest deadline (zero if already due).
    pub fn time_until_next(&self, now: Duration) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(now))
    }

    /// Remove and return the earliest timer whose deadline is `<= now`.
    ///
    /// Ties fire in scheduling order. Returns the deadline alongside the
    /// message so virtual clocks can advance to it.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, Duration, M)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.deadline <= now)
            .min_by_key(|(_, entry)| (entry.deadline, entry.seq))
            .map(|(index, _)| index)?;
        let entry = self.entries.swap_remove(index);
        Some((entry.id, entry.deadline, entry.msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn empty_queue_has_no_deadline() {
        let mut queue: TimerQueue<&str> = TimerQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
        assert!(queue.pop_due(Duration::MAX).is_none());
    }

    #[test]
    fn timers_never_fire_early() {
        let mut queue = TimerQueue::new();
        queue.schedule(TimerId(1), Duration::ZERO, 600 * MS, "tick");
        assert!(queue.pop_due(599 * MS).is_none());
        assert_eq!(
            queue.pop_due(600 * MS),
            Some((TimerId(1), 600 * MS, "tick"))
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn due_timers_pop_in_deadline_then_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(TimerId(1), Duration::ZERO, 30 * MS, 'a');
        queue.schedule(TimerId(2), Duration::ZERO, 10 * MS, 'b');
        queue.schedule(TimerId(3), Duration::ZERO, 10 * MS, 'c');
        assert_eq!(queue.ids(), vec![TimerId(2), TimerId(3), TimerId(1)]);

        let fired: Vec<char> = std::iter::from_fn(|| queue.pop_due(100 * MS))
            .map(|(_, _, msg)| msg)
            .collect();
        assert_eq!(fired, vec!['b', 'c', 'a']);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut queue = TimerQueue::new();
        queue.schedule(TimerId(7), Duration::ZERO, 5 * MS, ());
        assert!(queue.cancel(TimerId(7)));
        assert!(!queue.cancel(TimerId(7)));
        assert!(queue.pop_due(Duration::MAX).is_none());
    }

    #[test]
    fn rescheduling_same_id_replaces() {
        let mut queue = TimerQueue::new();
        assert!(!queue.schedule(TimerId(1), Duration::ZERO, 5 * MS, "old"));
        assert!(queue.schedule(TimerId(1), Duration::ZERO, 8 * MS, "new"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.time_until_next(2 * MS), Some(6 * MS));
        assert_eq!(queue.pop_due(8 * MS).map(|(_, _, m)| m), Some("new"));
    }

    #[test]
    fn clear_drops_everything() {
        let mut queue = TimerQueue::new();
        queue.schedule(TimerId(1), Duration::ZERO, MS, ());
        queue.schedule(TimerId(2), Duration::ZERO, MS, ());
        assert_eq!(queue.clear(), 2);
        assert!(!queue.contains(TimerId(1)));
    }
}
