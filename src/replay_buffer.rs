use crate::game_input::StateVector;
use crate::snake::Move;
use rand::Rng;
use rand::seq::index;
use std::collections::VecDeque;

/// One experience tuple (s, a, r, s', done).
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: StateVector,
    pub action: Move,
    pub reward: f32,
    pub next_state: StateVector,
    pub done: bool,
}

/// Bounded FIFO of transitions; the oldest entry is evicted once full.
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity.min(1 << 16)),
            capacity,
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    /// `batch_size` distinct transitions chosen uniformly, or everything when smaller.
    pub fn sample<R: Rng>(&self, rng: &mut R, batch_size: usize) -> Vec<&Transition> {
        if self.buffer.len() <= batch_size {
            return self.buffer.iter().collect();
        }
        index::sample(rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect()
    }
}
