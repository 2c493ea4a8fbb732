// src/task_queue.rs
//
// Bounded priority queue with FIFO ordering among equal priorities.
//
// Transfer sub-tasks for one object must drain in a deterministic relative
// order, so each entry is keyed by (priority, enqueue sequence): strictly
// ascending priority, arrival order inside a priority class. The worker
// pool that drains the queue lives outside this crate.

use log::trace;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as MemOrdering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use thiserror::Error;

use crate::constants::{DEFAULT_MAX_PRIORITY, DEFAULT_QUEUE_MAXSIZE};

/// Scheduling priority capability for queued tasks, 1 = most urgent.
///
/// The default implementation reports no preference; such tasks are
/// scheduled at the queue's lowest priority, behind anything that asked
/// for an explicit slot.
pub trait HasPriority {
    fn priority(&self) -> Option<u32> {
        None
    }
}

// Forward priority through a shared-ownership wrapper so `Arc<T>` queues
// (the common case for clonable task handles) inherit the task's priority.
impl<T: HasPriority + ?Sized> HasPriority for Arc<T> {
    fn priority(&self) -> Option<u32> {
        (**self).priority()
    }
}

/// Non-blocking `put` failed; the task is handed back untouched.
#[derive(Error, Debug)]
pub enum TryPutError<T> {
    #[error("task queue is at capacity")]
    Full(T),
}

/// Non-blocking `get` found nothing pending.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryGetError {
    #[error("task queue is empty")]
    Empty,
}

struct Entry<T> {
    priority: u32,
    seq: u64,
    task: T,
}

// Ordering ignores the task payload: (priority, seq) alone decides, which
// is exactly the FIFO tie-break.
impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.priority, self.seq).cmp(&(other.priority, other.seq))
    }
}

/// Thread-safe bounded queue ordering tasks by ascending priority, FIFO
/// among equals. `put` blocks at capacity (backpressure for producers),
/// `get` blocks while empty; the `try_` variants fail instead.
///
/// Tasks come back out by value, identity preserved: the queue wraps each
/// task in an ordering key on the way in and strips it on the way out.
pub struct StablePriorityQueue<T> {
    heap: Mutex<BinaryHeap<Reverse<Entry<T>>>>,
    not_empty: Condvar,
    not_full: Condvar,
    maxsize: usize,
    max_priority: u32,
    seq: AtomicU64,
}

// A panicked producer must not wedge the worker pool, so poisoned locks
// are recovered rather than propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T: HasPriority> StablePriorityQueue<T> {
    /// `maxsize == 0` means unbounded. Priorities above `max_priority` are
    /// clamped down to it; `max_priority` is also the sentinel assigned to
    /// tasks without an explicit priority.
    pub fn new(maxsize: usize, max_priority: u32) -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            maxsize,
            max_priority,
            seq: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_QUEUE_MAXSIZE, DEFAULT_MAX_PRIORITY)
    }

    /// Enqueue `task`, blocking while the queue is at capacity.
    pub fn put(&self, task: T) {
        let priority = self.effective_priority(&task);
        let mut heap = lock(&self.heap);
        while self.at_capacity(&heap) {
            heap = self
                .not_full
                .wait(heap)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        self.push_entry(&mut heap, priority, task);
        drop(heap);
        self.not_empty.notify_one();
    }

    /// Enqueue without blocking; a full queue returns the task in the error.
    pub fn try_put(&self, task: T) -> Result<(), TryPutError<T>> {
        let priority = self.effective_priority(&task);
        let mut heap = lock(&self.heap);
        if self.at_capacity(&heap) {
            return Err(TryPutError::Full(task));
        }
        self.push_entry(&mut heap, priority, task);
        drop(heap);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue the task with the smallest (priority, sequence) key,
    /// blocking until one is available.
    pub fn get(&self) -> T {
        let mut heap = lock(&self.heap);
        loop {
            if let Some(Reverse(entry)) = heap.pop() {
                drop(heap);
                self.not_full.notify_one();
                return entry.task;
            }
            heap = self
                .not_empty
                .wait(heap)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Dequeue without blocking.
    pub fn try_get(&self) -> Result<T, TryGetError> {
        let mut heap = lock(&self.heap);
        match heap.pop() {
            Some(Reverse(entry)) => {
                drop(heap);
                self.not_full.notify_one();
                Ok(entry.task)
            }
            None => Err(TryGetError::Empty),
        }
    }

    /// Pending-task count. Advisory only while other threads are mid
    /// `put`/`get`.
    pub fn qsize(&self) -> usize {
        lock(&self.heap).len()
    }

    // Missing priority maps to the lowest-priority sentinel; explicit
    // values are clamped down to the ceiling, never up.
    fn effective_priority(&self, task: &T) -> u32 {
        task.priority()
            .unwrap_or(self.max_priority)
            .min(self.max_priority)
    }

    fn at_capacity(&self, heap: &BinaryHeap<Reverse<Entry<T>>>) -> bool {
        self.maxsize > 0 && heap.len() >= self.maxsize
    }

    fn push_entry(&self, heap: &mut BinaryHeap<Reverse<Entry<T>>>, priority: u32, task: T) {
        let seq = self.seq.fetch_add(1, MemOrdering::Relaxed);
        trace!("enqueue priority={priority} seq={seq}");
        heap.push(Reverse(Entry { priority, seq, task }));
    }
}
