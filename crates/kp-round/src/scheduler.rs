//! Single-shot delayed continuations on a virtual millisecond clock
//!
//! The engine never sleeps. Every wait is a task scheduled here and released
//! when the host advances the clock past its due time.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Handle of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Scheduled<T> {
    due_ms: f64,
    id: TaskId,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    // Reversed: BinaryHeap is a max-heap, earliest due (then earliest id) must surface first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Queue of delayed single-shot tasks
#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: f64,
    next_id: u64,
    queue: BinaryHeap<Scheduled<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current clock
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Run `task` once, `delay_ms` from now. Negative or NaN delays mean "now".
    pub fn schedule(&mut self, delay_ms: f64, task: T) -> TaskId {
        let delay = if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 };
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.push(Scheduled {
            due_ms: self.now_ms + delay,
            id,
            task,
        });
        id
    }

    /// Drop one pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|s| s.id != id);
        self.queue.len() != before
    }

    /// Drop every pending task, returns how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    /// Due time of the earliest pending task
    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|s| s.due_ms)
    }

    /// Release the earliest task due at or before `until_ms`, moving the clock to its due time
    pub fn pop_due(&mut self, until_ms: f64) -> Option<T> {
        if self.next_due()? > until_ms {
            return None;
        }
        self.pop_next()
    }

    /// Release the earliest task regardless of the clock
    pub fn pop_next(&mut self) -> Option<T> {
        let scheduled = self.queue.pop()?;
        self.now_ms = self.now_ms.max(scheduled.due_ms);
        Some(scheduled.task)
    }

    /// Move the clock forward without releasing anything
    pub fn advance_clock_to(&mut self, until_ms: f64) {
        if until_ms.is_finite() {
            self.now_ms = self.now_ms.max(until_ms);
        }
    }

    /// Pending task payloads, earliest first
    pub fn pending(&self) -> Vec<&T> {
        let mut entries: Vec<&Scheduled<T>> = self.queue.iter().collect();
        // Ord is reversed, so descending order means earliest first
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|s| &s.task).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
