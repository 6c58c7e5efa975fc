use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Handle of a task scheduled in a [`TaskQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

struct Entry<T> {
    deadline: f64,
    id: TaskId,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed so the max-heap pops the earliest deadline, then the oldest task.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .total_cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Deferred work keyed by a virtual deadline, processed once per tick.
///
/// Tasks with equal deadlines run in the order they were scheduled. A
/// cancelled task never comes out of [`TaskQueue::drain_due`].
pub struct TaskQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    live: HashSet<TaskId>,
    next_id: u64,
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashSet::new(),
            next_id: 0,
        }
    }

    pub fn schedule(&mut self, deadline: f64, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.heap.push(Entry {
            deadline,
            id,
            payload,
        });
        id
    }

    /// Cancel one task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.live.remove(&id)
    }

    pub fn cancel_all(&mut self) {
        self.heap.clear();
        self.live.clear();
    }

    /// Remove and return every live task due at `now`, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<T> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|e| e.deadline <= now) {
            let Some(entry) = self.heap.pop() else {
                break;
            };
            if self.live.remove(&entry.id) {
                due.push(entry.payload);
            }
        }
        due
    }

    /// Number of live tasks.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
