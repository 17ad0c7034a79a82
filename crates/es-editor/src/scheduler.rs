//! Deferred task queue on a caller-driven clock.
//!
//! The engine runs single-threaded; time only moves when the host calls
//! `advance`. Tasks fire once, in deadline order, ties in schedule order.

use std::time::Duration;

#[derive(Debug, Clone)]
struct Pending<T> {
    due: Duration,
    seq: u64,
    task: T,
}

#[derive(Debug, Clone)]
pub struct DeferredQueue<T> {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` has elapsed from the current clock.
    pub fn schedule(&mut self, delay: Duration, task: T) {
        self.pending.push(Pending {
            due: self.now + delay,
            seq: self.next_seq,
            task,
        });
        self.next_seq += 1;
    }

    /// Move the clock forward and return every task that became due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        self.now += elapsed;
        let now = self.now;
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = rest;
        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.task).collect()
    }

    /// Drop pending tasks that no longer satisfy `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.pending.retain(|p| keep(&p.task));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_delay_not_before() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Duration::from_millis(50), "reselect");
        assert!(queue.advance(Duration::from_millis(49)).is_empty());
        assert_eq!(queue.advance(Duration::from_millis(1)), vec!["reselect"]);
        assert!(queue.is_empty());
        assert!(queue.advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn due_tasks_come_out_in_deadline_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Duration::from_millis(30), 'b');
        queue.schedule(Duration::from_millis(10), 'a');
        queue.schedule(Duration::from_millis(30), 'c');
        queue.schedule(Duration::from_millis(90), 'd');
        assert_eq!(queue.advance(Duration::from_millis(40)), vec!['a', 'b', 'c']);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn retain_drops_cancelled_tasks() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Duration::from_millis(10), 1);
        queue.schedule(Duration::from_millis(10), 2);
        queue.retain(|task| *task != 1);
        assert_eq!(queue.advance(Duration::from_millis(10)), vec![2]);
    }
}
