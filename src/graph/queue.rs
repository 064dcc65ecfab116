use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Minimum-priority queue backing the shortest-path search.
///
/// Duplicate items are accepted unconditionally: a caller that finds a
/// better priority for an item pushes a fresh entry instead of locating
/// and updating the old one, and discards the stale entry when it
/// surfaces (lazy decrease-key). Entries with equal priority pop in
/// insertion order, which keeps searches deterministic.
pub struct SearchQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

struct Entry<T> {
    item: T,
    priority: f32,
    seq: u64,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority.total_cmp(&other.priority) == Ordering::Equal && self.seq == other.seq
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
        // Reversed so the max-heap pops the smallest priority first; the
        // sequence number keeps equal priorities in FIFO order.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> SearchQueue<T> {
    pub fn new() -> Self {
        SearchQueue {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Insert `item` with the given priority. Duplicates of an item
    /// already queued are allowed.
    pub fn push(&mut self, item: T, priority: f32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            item,
            priority,
            seq,
        });
    }

    /// Remove and return the item with the smallest priority, oldest
    /// first among equals. `None` when the queue is empty.
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|e| e.item)
    }

    /// The item `pop` would return next, with its priority.
    pub fn peek(&self) -> Option<(&T, f32)> {
        self.heap.peek().map(|e| (&e.item, e.priority))
    }

    /// Number of queued entries, stale duplicates included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}

impl<T> Default for SearchQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
