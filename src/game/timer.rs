//! Generation-tagged timer queue
//!
//! Realizes "schedule a callback at time T, cancel everything for a tag" as
//! a pollable queue: the host pumps `pop_due(now_ms)` from its frame loop
//! (requestAnimationFrame on the web, a plain loop natively). Nothing here
//! blocks or owns a thread.
//!
//! Entries from a cancelled tag are dropped silently on pop — a late poll
//! after cancellation never observes stale work.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

struct Entry<T> {
    due_ms: u64,
    /// Insertion order, tie-breaker so equal due times keep schedule order
    seq: u64,
    tag: u64,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due_ms, self.seq).cmp(&(other.due_ms, other.seq))
    }
}

/// Min-heap of timed payloads with cancellation by schedule-generation tag.
pub struct TimerQueue<T> {
    heap: BinaryHeap<Reverse<Entry<T>>>,
    next_seq: u64,
    next_tag: u64,
    cancelled: BTreeSet<u64>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            next_tag: 0,
            cancelled: BTreeSet::new(),
        }
    }

    /// Allocate a fresh schedule-generation tag. Tags are monotonic and
    /// never reused, so a cancelled tag stays dead.
    pub fn next_tag(&mut self) -> u64 {
        let tag = self.next_tag;
        self.next_tag += 1;
        tag
    }

    /// Enqueue `payload` to become due at `due_ms`, associated with `tag`.
    pub fn schedule_at(&mut self, due_ms: u64, tag: u64, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            due_ms,
            seq,
            tag,
            payload,
        }));
    }

    /// Drop every pending entry scheduled under `tag`.
    pub fn cancel_all(&mut self, tag: u64) {
        self.cancelled.insert(tag);
    }

    /// Pop the earliest entry with `due_ms <= now_ms`, skipping cancelled
    /// tags. Equal due times come out in insertion order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(T, u64)> {
        while let Some(Reverse(entry)) = self.heap.peek() {
            if self.cancelled.contains(&entry.tag) {
                self.heap.pop();
                continue;
            }
            if entry.due_ms > now_ms {
                return None;
            }
            let Reverse(entry) = self.heap.pop()?;
            if self.heap.is_empty() {
                // No live entry can resurrect a dead tag; safe to forget them
                self.cancelled.clear();
            }
            return Some((entry.payload, entry.due_ms));
        }
        self.cancelled.clear();
        None
    }

    /// Number of entries still queued (including not-yet-dropped cancelled ones)
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
