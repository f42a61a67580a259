#![forbid(unsafe_code)]

//! Deterministic timer queue.
//!
//! Timers are kept in a small vector; a page schedules a handful at most
//! (resize debounce, submission phases, flag restart), so a linear scan for
//! the earliest due entry is all that is needed.
//!
//! # Invariants
//!
//! 1. Timers fire in `(due, scheduling order)` order.
//! 2. At most one timer per [`TimerKey`] is pending.
//! 3. A timer never fires before its due time.

use core::fmt;
use core::time::Duration;

use crate::program::{Task, TaskSpec, TimerKey};

/// What a timer delivers when it fires.
pub enum TimerPayload<M> {
    /// A ready message.
    Msg(M),
    /// Deferred work run at fire time.
    Task(TaskSpec, Task<M>),
}

impl<M> TimerPayload<M> {
    /// Produce the message, running the task if needed.
    pub fn into_message(self) -> M {
        match self {
            Self::Msg(m) => m,
            Self::Task(spec, run) => {
                tracing::debug!(target: "pageflow.runtime", task = spec.name, "running deferred task");
                run()
            }
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for TimerPayload<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Task(spec, _) => f.debug_tuple("Task").field(spec).finish_non_exhaustive(),
        }
    }
}

struct Scheduled<M> {
    due: Duration,
    seq: u64,
    key: Option<TimerKey>,
    payload: TimerPayload<M>,
}

/// A timer that came due.
#[derive(Debug)]
pub struct FiredTimer<M> {
    /// When the timer was due (not when it was observed).
    pub due: Duration,
    pub key: Option<TimerKey>,
    pub payload: TimerPayload<M>,
}

/// Pending timers ordered by due time.
pub struct TimerQueue<M> {
    entries: Vec<Scheduled<M>>,
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
            .field("pending", &self.entries.len())
            .field("next_due", &self.next_due())
            .finish()
    }
}

impl<M> TimerQueue<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` at `now + delay`.
    ///
    /// A keyed timer replaces the pending timer with the same key; the
    /// replacement gets a fresh scheduling order.
    pub fn schedule(
        &mut self,
        now: Duration,
        delay: Duration,
        key: Option<TimerKey>,
        payload: TimerPayload<M>,
    ) {
        if let Some(key) = key {
            self.cancel(key);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Scheduled {
            due: now.saturating_add(delay),
            seq,
            key,
            payload,
        });
    }

    /// Drop the pending timer named `key`. Returns whether one was pending.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != Some(key));
        before != self.entries.len()
    }

    /// Whether a timer named `key` is pending.
    #[must_use]
    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.entries.iter().any(|e| e.key == Some(key))
    }

    /// Earliest due time, if any timer is pending.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<FiredTimer<M>> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(idx, _)| idx)?;
        let entry = self.entries.remove(idx);
        Some(FiredTimer {
            due: entry.due,
            key: entry.key,
            payload: entry.payload,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
