use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Bounded store for acquired samples.
///
/// One entry per sample, each a frame of `num_rows` values matching a
/// `BoardDescriptor` row layout. Wrap in `Arc<parking_lot::Mutex<_>>` to
/// share between a capture thread and the retrieving session.
///
/// Overflow behavior: drops oldest samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBuffer {
    num_rows: usize,
    capacity: usize,
    frames: VecDeque<Vec<f64>>,
}

impl SampleBuffer {
    pub fn new(num_rows: usize, capacity: usize) -> Self {
        Self {
            num_rows,
            capacity,
            frames: VecDeque::with_capacity(capacity.min(4096)),
        }
    }

    /// Append one frame.
    ///
    /// Frames shorter than the row count are zero-padded, longer ones are
    /// truncated. If the buffer is full the oldest frame is dropped.
    pub fn push(&mut self, mut frame: Vec<f64>) {
        if self.capacity == 0 {
            return;
        }
        frame.resize(self.num_rows, 0.0);
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// View the buffer as a channel-major matrix: `num_rows` rows, one
    /// column per sample, oldest first.
    pub fn to_channel_major(&self) -> Vec<Vec<f64>> {
        let mut matrix = vec![vec![0.0; self.frames.len()]; self.num_rows];
        for (col, frame) in self.frames.iter().enumerate() {
            for (row, &value) in frame.iter().enumerate() {
                matrix[row][col] = value;
            }
        }
        matrix
    }
}
