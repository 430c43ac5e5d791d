// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Delayed tasks on a single thread, ordered by due time and then by the
/// order they were posted. Nothing is cancelled; stale tasks must no-op on
/// their own.
#[derive(Debug)]
pub struct Scheduler<T> {
    heap: BinaryHeap<Reverse<(u64, u64, Slot<T>)>>,
    seq: u64,
}

// Ordering wrapper so the payload never takes part in comparisons.
#[derive(Debug)]
struct Slot<T>(T);

impl<T> PartialEq for Slot<T> {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}
impl<T> Eq for Slot<T> {}
impl<T> PartialOrd for Slot<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Slot<T> {
    fn cmp(&self, _: &Self) -> std::cmp::Ordering {
        std::cmp::Ordering::Equal
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self { heap: BinaryHeap::new(), seq: 0 }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to run at `now + delay_ms`. Returns the due time.
    pub fn post_delayed(&mut self, now: u64, delay_ms: u64, task: T) -> u64 {
        let due = now.saturating_add(delay_ms);
        self.heap.push(Reverse((due, self.seq, Slot(task))));
        self.seq += 1;
        due
    }

    /// Earliest task whose due time has passed.
    pub fn pop_due(&mut self, now: u64) -> Option<T> {
        match self.heap.peek() {
            Some(Reverse((due, _, _))) if *due <= now => {
                self.heap.pop().map(|Reverse((_, _, Slot(t)))| t)
            }
            _ => None,
        }
    }

    /// Every task due at `now`, in order. Tasks posted while the batch runs
    /// wait for the next call, even when they are already due.
    pub fn take_due(&mut self, now: u64) -> Vec<T> {
        let mut batch = Vec::new();
        while let Some(task) = self.pop_due(now) {
            batch.push(task);
        }
        batch
    }

    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse((due, _, _))| *due)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_in_due_order_then_fifo() {
        let mut s = Scheduler::new();
        s.post_delayed(0, 300, "late");
        s.post_delayed(0, 100, "a");
        s.post_delayed(50, 50, "b");
        assert_eq!(s.next_due(), Some(100));
        assert_eq!(s.pop_due(99), None);
        assert_eq!(s.pop_due(100), Some("a"));
        assert_eq!(s.pop_due(100), Some("b"));
        assert_eq!(s.pop_due(100), None);
        assert_eq!(s.len(), 1);
        assert_eq!(s.pop_due(1_000), Some("late"));
        assert!(s.is_empty());
    }

    #[test]
    fn take_due_leaves_later_posts_queued() {
        let mut s = Scheduler::new();
        s.post_delayed(0, 10, 1);
        s.post_delayed(0, 10, 2);
        s.post_delayed(0, 20, 3);
        assert_eq!(s.take_due(10), vec![1, 2]);
        s.post_delayed(10, 0, 4);
        assert_eq!(s.take_due(10), vec![4]);
        assert_eq!(s.len(), 1);
    }
}
