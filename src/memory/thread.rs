//! Bounded in-process buffer of conversation turns.
//!
//! [`ThreadMemory`] keeps at most `capacity` turns in insertion order and evicts the
//! oldest one first. It is not synchronized; share it behind a lock.

use std::collections::VecDeque;

use chrono::Utc;

use super::types::Turn;

/// Default number of turns kept per thread.
pub const DEFAULT_THREAD_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct ThreadMemory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl Default for ThreadMemory {
    fn default() -> Self {
        Self::new(DEFAULT_THREAD_CAPACITY)
    }
}

impl ThreadMemory {
    /// Create an empty buffer. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a turn stamped with the current time and evict the oldest turn if the
    /// buffer is over capacity. Returns a copy of the appended turn.
    pub fn add(&mut self, author: &str, content: &str) -> Turn {
        let mut timestamp = Utc::now();
        // Wall clocks can step backwards; keep the thread's timestamps non-decreasing.
        if let Some(last) = self.turns.back() {
            if last.timestamp > timestamp {
                timestamp = last.timestamp;
            }
        }

        let turn = Turn::new(author, content, timestamp);
        self.turns.push_back(turn.clone());
        if self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
        turn
    }

    /// Independent copy of the buffered turns, oldest first.
    pub fn get_messages(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
