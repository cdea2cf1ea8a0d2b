//! Fixed-capacity rolling window of observations.

use std::collections::VecDeque;

use crate::models::Observation;

/// FIFO window: once full, every append evicts the oldest observation.
#[derive(Debug, Clone)]
pub struct ObservationBuffer {
    capacity: usize,
    items: VecDeque<Observation>,
}

impl ObservationBuffer {
    /// A zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Append `observation`, returning the evicted one if the window was full.
    pub fn append(&mut self, observation: Observation) -> Option<Observation> {
        self.items.push_back(observation);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    /// Contiguous, ordered view of the window for the indicator engine.
    pub fn as_slice(&mut self) -> &[Observation] {
        self.items.make_contiguous()
    }

    /// Owned copy of the window, oldest first.
    pub fn snapshot(&self) -> Vec<Observation> {
        self.items.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
