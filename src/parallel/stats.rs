/// Per-run counters reported by the worker pool.
///
/// Attached to a sort via the builder; zeroed when the sort starts and
/// filled in when it completes.
#[derive(Debug, Default, Clone)]
pub struct SortStats {
    /// Elements partitioned or recursed on, per worker.
    pub elements: Vec<u64>,
    /// Chunks taken from the queue, per worker.
    pub chunks: Vec<u64>,
    /// Largest observed length of the chunk queue.
    pub max_queue_len: usize,
}

impl SortStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self, num_threads: usize) {
        self.elements.clear();
        self.elements.resize(num_threads, 0);
        self.chunks.clear();
        self.chunks.resize(num_threads, 0);
        self.max_queue_len = 0;
    }
}

/// Tallies kept by one worker and merged after the pool joins.
#[derive(Default)]
pub(crate) struct WorkerStats {
    pub(crate) elements: u64,
    pub(crate) chunks: u64,
}
