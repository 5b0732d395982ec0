use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// One-shot deferred actions keyed by due time in nanoseconds.
///
/// Entries come out in due order; entries due at the same instant come out in
/// the order they were scheduled. Nothing runs by itself: the owner polls
/// [`Scheduler::pop_due`] from its event loop.
#[derive(Debug)]
pub struct Scheduler<E> {
    queue: BinaryHeap<Reverse<Entry<E>>>,
    next_seq: u64,
}

#[derive(Debug)]
struct Entry<E> {
    due: u64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedules `event` to fire `delay` after `from` (ns).
    pub fn schedule(&mut self, from: u64, delay: Duration, event: E) -> u64 {
        let due = from.saturating_add(delay.as_nanos() as u64);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry { due, seq, event }));
        due
    }

    /// Removes and returns the earliest entry due at or before `now`, with the
    /// instant it was due.
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, E)> {
        match self.queue.peek() {
            Some(Reverse(entry)) if entry.due <= now => {}
            _ => return None,
        }
        self.queue
            .pop()
            .map(|Reverse(entry)| (entry.due, entry.event))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
