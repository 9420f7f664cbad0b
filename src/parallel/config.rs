/// Pop order of the shared chunk queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum QueueMode {
    /// Pop the oldest chunk first. Tends to keep chunks large, so masters
    /// recruit slaves more often.
    Fifo,
    /// Pop the newest chunk first. Tends toward depth-first processing with
    /// smaller chunks and better locality.
    Lifo,
}

/// Configuration of the worker pool.
///
/// `num_threads` workers cooperate on one sort. A worker that picks up a
/// chunk larger than `slave_fac` times the per-worker share recruits the
/// other workers as slaves for a single cooperative bit level; see the pool
/// module for the mechanism.
#[derive(Debug, Clone)]
pub struct ThreadConfig {
    /// Number of worker threads, at least 1.
    pub num_threads: usize,
    /// Queue pop order.
    pub queue_mode: QueueMode,
    /// Allow cooperative partitioning of large chunks.
    pub use_slaves: bool,
    /// Multiplier on the per-worker share above which slaves are recruited.
    /// Values below 1.0 make every worker want to be a master; keep this at
    /// 1.0 or above.
    pub slave_fac: f64,
}

impl ThreadConfig {
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads,
            queue_mode: QueueMode::Fifo,
            use_slaves: true,
            slave_fac: 1.0,
        }
    }
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
