//! Shared work queue.
//!
//! One mutex-guarded deque of pending chunks plus a condition variable.
//! Chunks are pushed at the back; the configured queue mode decides which
//! end gets popped. Waking is one-shot: each push notifies a single waiter,
//! and a terminating worker passes the wake-up on so the remaining sleepers
//! drain out one by one.

use super::config::QueueMode;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// A pending unit of work: an index range, the bit to partition on and the
/// partition direction. Slave chunks additionally carry the worker index of
/// their master and their slot in the master's result vector; a chunk
/// without a master may be recursed on in full.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Chunk {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) bit_no: u32,
    pub(crate) up: bool,
    pub(crate) master: Option<(usize, usize)>,
}

impl Chunk {
    pub(crate) fn len(&self) -> usize {
        self.end - self.start
    }
}

struct QueueState {
    chunks: VecDeque<Chunk>,
    waiting: usize,
    max_len: usize,
}

pub(crate) struct ChunkQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    mode: QueueMode,
}

impl ChunkQueue {
    /// Create the queue already holding the initial chunk, so workers
    /// started afterwards cannot observe an empty queue and terminate
    /// immediately.
    pub(crate) fn with_first_chunk(mode: QueueMode, chunk: Chunk) -> Self {
        let mut chunks = VecDeque::new();
        chunks.push_back(chunk);
        Self {
            state: Mutex::new(QueueState {
                chunks,
                waiting: 0,
                max_len: 1,
            }),
            available: Condvar::new(),
            mode,
        }
    }

    pub(crate) fn add_chunk(&self, chunk: Chunk) {
        let mut state = self.state.lock().unwrap();
        state.chunks.push_back(chunk);
        state.max_len = state.max_len.max(state.chunks.len());
        self.available.notify_one();
    }

    /// Block until a chunk is available or the pool is done.
    ///
    /// Returns `None` when the queue is empty and every worker of the pool
    /// is waiting, which is the termination condition: nothing queued and
    /// nobody left who could queue more. The terminating worker wakes one
    /// other waiter so termination ripples through the pool.
    pub(crate) fn next_chunk(&self, num_workers: usize) -> Option<Chunk> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(chunk) = self.pop(&mut state.chunks) {
                return Some(chunk);
            }
            state.waiting += 1;
            if state.waiting >= num_workers {
                self.available.notify_one();
                return None;
            }
            state = self.available.wait(state).unwrap();
            state.waiting -= 1;
        }
    }

    fn pop(&self, chunks: &mut VecDeque<Chunk>) -> Option<Chunk> {
        match self.mode {
            QueueMode::Fifo => chunks.pop_front(),
            QueueMode::Lifo => chunks.pop_back(),
        }
    }

    pub(crate) fn max_len(&self) -> usize {
        self.state.lock().unwrap().max_len
    }
}
