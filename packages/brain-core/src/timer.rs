//! Engine-owned task scheduler
//!
//! A virtual millisecond clock holding one-shot and repeating tasks. The
//! host moves time forward (`performance.now()` in the browser, a counter in
//! tests and simulations); nothing fires on its own, and a cancelled task is
//! gone for good.
//!
//! Engines drain due tasks one at a time with [`Scheduler::pop_due`], so a
//! task that ends the game can cancel everything queued behind it.

use serde::Serialize;

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    id: TaskId,
    due_ms: u64,
    period_ms: Option<u64>,
    /// Missed periods collapse into one firing
    coalesce: bool,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    pending: Vec<ScheduledTask<T>>,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    /// Run `task` once, `delay_ms` from now
    pub fn schedule_once(&mut self, delay_ms: u64, task: T) -> TaskId {
        self.push(delay_ms, None, false, task)
    }

    /// Run `task` every `period_ms`, first time one period from now
    pub fn schedule_repeating(&mut self, period_ms: u64, task: T) -> TaskId {
        let period = period_ms.max(1);
        self.push(period, Some(period), false, task)
    }

    /// Like [`Scheduler::schedule_repeating`], but a gap longer than one
    /// period fires once, at the latest missed tick
    pub fn schedule_coalescing(&mut self, period_ms: u64, task: T) -> TaskId {
        let period = period_ms.max(1);
        self.push(period, Some(period), true, task)
    }

    /// Returns `false` when the task already fired or was cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    /// Drop every pending task, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Take the earliest task due at or before `until_ms`.
    ///
    /// The clock moves to the task's due time. Repeating tasks are re-armed
    /// one period later, so a long gap replays every missed tick in order;
    /// coalescing tasks skip ahead to the latest missed tick instead.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<T> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let entry = &mut self.pending[index];
        match entry.period_ms {
            Some(period) => {
                let fire_ms = if entry.coalesce {
                    entry.due_ms + (until_ms - entry.due_ms) / period * period
                } else {
                    entry.due_ms
                };
                entry.due_ms = fire_ms + period;
                self.now_ms = self.now_ms.max(fire_ms);
                Some(entry.task.clone())
            }
            None => {
                let due_ms = entry.due_ms;
                self.now_ms = self.now_ms.max(due_ms);
                Some(self.pending.swap_remove(index).task)
            }
        }
    }

    /// Move the clock to `now_ms` once nothing else is due. Never goes back.
    pub fn settle(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn push(&mut self, delay_ms: u64, period_ms: Option<u64>, coalesce: bool, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(ScheduledTask {
            id,
            due_ms: self.now_ms + delay_ms,
            period_ms,
            coalesce,
            task,
        });
        id
    }
}
