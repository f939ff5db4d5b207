//! Cancellable task scheduler on a virtual monotonic clock.
//!
//! The scheduler never fires anything by itself. The owner moves the clock
//! forward with [`Scheduler::pop_due`], one task at a time, and dispatches
//! each returned task before asking for the next. A task cancelled while an
//! earlier task is being handled is therefore never returned.
//!
//! ```text
//! every(1s, CountdownTick) -> handle
//! pop_due(until) -> Some((handle, CountdownTick))   // clock := deadline
//! cancel(handle)                                    // never fires again
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifies one scheduled task. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(u64);

/// What a scheduled task does when it comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    CountdownTick,
    ToneRepeat,
    AlarmAutoStop,
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TaskHandle,
    kind: TaskKind,
    due_ms: u64,
    /// `Some` for repeating tasks.
    period_ms: Option<u64>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position of the virtual clock.
    pub fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms)
    }

    /// Schedule `kind` to fire every `period`, first at `now + period`.
    pub fn every(&mut self, period: Duration, kind: TaskKind) -> TaskHandle {
        let period_ms = (period.as_millis() as u64).max(1);
        self.push(kind, period_ms, Some(period_ms))
    }

    /// Schedule `kind` to fire once at `now + delay`.
    pub fn after(&mut self, delay: Duration, kind: TaskKind) -> TaskHandle {
        self.push(kind, delay.as_millis() as u64, None)
    }

    fn push(&mut self, kind: TaskKind, delay_ms: u64, period_ms: Option<u64>) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            kind,
            due_ms: self.now_ms.saturating_add(delay_ms),
            period_ms,
        });
        handle
    }

    /// Remove a task. Returns `false` if it was not scheduled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Remove every task. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Deadline of the next task, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.earliest().map(|i| Duration::from_millis(self.entries[i].due_ms))
    }

    /// Deadline of a specific task, if it is still scheduled.
    pub fn due_at(&self, handle: TaskHandle) -> Option<Duration> {
        self.entries
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| Duration::from_millis(e.due_ms))
    }

    /// Take the earliest task due at or before `until`.
    ///
    /// Moves the clock to the task's deadline. Repeating tasks are re-armed
    /// one period later and keep their handle. Ties fire in creation order.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskHandle, TaskKind)> {
        let until_ms = until.as_millis() as u64;
        let idx = self.earliest()?;
        if self.entries[idx].due_ms > until_ms {
            return None;
        }
        let due_ms = self.entries[idx].due_ms;
        self.now_ms = self.now_ms.max(due_ms);

        let Entry {
            handle,
            kind,
            period_ms,
            ..
        } = self.entries[idx];
        match period_ms {
            Some(period) => self.entries[idx].due_ms = due_ms.saturating_add(period),
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some((handle, kind))
    }

    /// Move the clock forward without firing anything. Never moves backward.
    pub fn settle(&mut self, to: Duration) {
        self.now_ms = self.now_ms.max(to.as_millis() as u64);
    }

    fn earliest(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| (e.due_ms, e.handle.0))
            .map(|(i, _)| i)
    }
}
