//! Worker pool with cooperative single-bit partitioning.
//!
//! Every worker loops on the shared chunk queue. A chunk tagged with a
//! master is one portion of a larger range: the worker partitions it on the
//! chunk's bit, reports the resulting region to the master's slot and goes
//! back to the queue. An untagged chunk belongs to the worker alone; it
//! either recurses on it in full (small chunks) or peels off one bit level
//! at a time, enqueueing the high half and keeping the low half, so other
//! workers can steal the enqueued halves.
//!
//! A worker whose untagged chunk exceeds the slave threshold becomes a
//! master: it splits the range into portions, enqueues all but the first as
//! slave chunks, partitions the first itself, sleeps until every portion
//! has reported, and merges the local splits by block swapping (see the
//! regions module). Becoming a master is refused when it would leave no
//! non-master worker, since masters cannot serve each other's portions;
//! the refused worker partitions the level alone instead.
//!
//! The data array itself is never locked. Portions of one master are
//! mutually disjoint, and the merge only runs after all of them have been
//! reported, so every element is touched by exactly one thread at a time.

use super::config::ThreadConfig;
use super::queue::{Chunk, ChunkQueue};
use super::regions::{merge_regions, Region};
use super::stats::{SortStats, WorkerStats};
use crate::sort_key::{SortElement, SortKey};
use crate::sorts::recursion::{
    directions, radix_recursion_dyn, radix_sort, split_once, PartitionEngine,
};
use log::{debug, trace};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

/// Raw view of the data array shared by all workers.
///
/// Safety: callers of `range_mut` must hand out mutually disjoint ranges
/// across live borrows. The pool guarantees this by construction: queue
/// chunks never overlap, slave portions of one master are disjoint, and the
/// master re-borrows its full range only after every slave has reported.
struct SharedSlice<E> {
    ptr: *mut E,
    len: usize,
}

unsafe impl<E: Send> Send for SharedSlice<E> {}
unsafe impl<E: Send> Sync for SharedSlice<E> {}

impl<E> SharedSlice<E> {
    #[allow(clippy::mut_from_ref)]
    unsafe fn range_mut(&self, start: usize, end: usize) -> &mut [E] {
        debug_assert!(start <= end && end <= self.len);
        std::slice::from_raw_parts_mut(self.ptr.add(start), end - start)
    }
}

/// One master's rendezvous point with its slaves.
struct MasterSlot {
    state: Mutex<SlaveResults>,
    done: Condvar,
}

struct SlaveResults {
    ready: usize,
    regions: Vec<Region>,
}

impl MasterSlot {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlaveResults {
                ready: 0,
                regions: Vec::new(),
            }),
            done: Condvar::new(),
        }
    }

    /// Size the result vector before any slave chunk is enqueued.
    fn prepare(&self, portions: usize) {
        let mut state = self.state.lock().unwrap();
        state.ready = 0;
        state.regions.clear();
        state.regions.resize(portions, Region::default());
    }

    fn store(&self, slave_idx: usize, region: Region) {
        let mut state = self.state.lock().unwrap();
        state.regions[slave_idx] = region;
        state.ready += 1;
        self.done.notify_one();
    }

    fn wait_all(&self) -> Vec<Region> {
        let mut state = self.state.lock().unwrap();
        while state.ready < state.regions.len() {
            state = self.done.wait(state).unwrap();
        }
        std::mem::take(&mut state.regions)
    }
}

struct ThreadSorter<'a, K, E, P> {
    data: SharedSlice<E>,
    config: &'a ThreadConfig,
    queue: ChunkQueue,
    masters: Vec<MasterSlot>,
    active_masters: AtomicUsize,
    chunk_thresh: usize,
    chunk_slave_thresh: usize,
    cmp_thresh: usize,
    highest_bit: u32,
    lowest_bit: u32,
    /// The caller's direction, used by every insertion-sort leaf.
    up: bool,
    _sort: PhantomData<fn() -> (K, P)>,
}

/// Sort `d` with `config.num_threads` workers.
pub(crate) fn sort_parallel<K, E, P>(
    config: &ThreadConfig,
    stats: Option<&mut SortStats>,
    d: &mut [E],
    up: bool,
    cmp_thresh: usize,
) where
    K: SortKey,
    E: SortElement<K>,
    P: PartitionEngine<E>,
{
    assert!(
        config.num_threads >= 1,
        "ThreadConfig::num_threads must be at least 1, got {}",
        config.num_threads
    );

    let len = d.len();
    let num_threads = config.num_threads;
    let chunk_thresh = (len / num_threads).max(1);
    let chunk_slave_thresh = (config.slave_fac * chunk_thresh as f64) as usize;
    let highest_bit = K::BITS - 1;

    debug!(
        "parallel sort: {} elements, {} workers, chunk_thresh {}, slave_thresh {}, {:?}",
        len, num_threads, chunk_thresh, chunk_slave_thresh, config.queue_mode
    );

    let first = Chunk {
        start: 0,
        end: len,
        bit_no: highest_bit,
        up,
        master: None,
    };
    let sorter = ThreadSorter::<K, E, P> {
        data: SharedSlice {
            ptr: d.as_mut_ptr(),
            len,
        },
        config,
        queue: ChunkQueue::with_first_chunk(config.queue_mode, first),
        masters: (0..num_threads).map(|_| MasterSlot::new()).collect(),
        active_masters: AtomicUsize::new(0),
        chunk_thresh,
        chunk_slave_thresh,
        cmp_thresh,
        highest_bit,
        lowest_bit: 0,
        up,
        _sort: PhantomData,
    };

    let locals: Vec<WorkerStats> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..num_threads)
            .map(|idx| {
                let sorter = &sorter;
                s.spawn(move || sorter.worker(idx))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    if let Some(stats) = stats {
        stats.reset(num_threads);
        for (idx, local) in locals.iter().enumerate() {
            stats.elements[idx] = local.elements;
            stats.chunks[idx] = local.chunks;
        }
        stats.max_queue_len = sorter.queue.max_len();
    }
}

impl<K, E, P> ThreadSorter<'_, K, E, P>
where
    K: SortKey,
    E: SortElement<K>,
    P: PartitionEngine<E>,
{
    fn worker(&self, idx: usize) -> WorkerStats {
        let mut local = WorkerStats::default();
        while let Some(chunk) = self.queue.next_chunk(self.config.num_threads) {
            local.chunks += 1;
            if let Some((master_idx, slave_idx)) = chunk.master {
                // One portion of somebody else's range: partition a single
                // bit level and report back.
                local.elements += chunk.len() as u64;
                let d = unsafe { self.data.range_mut(chunk.start, chunk.end) };
                let (split, _, _) = self.split_level(d, chunk.bit_no, chunk.up);
                self.masters[master_idx].store(
                    slave_idx,
                    Region {
                        start: chunk.start,
                        split: chunk.start + split,
                        end: chunk.end,
                    },
                );
                continue;
            }
            self.process_chunk(idx, chunk, &mut local);
        }
        trace!(
            "worker {} done: {} chunks, {} elements",
            idx,
            local.chunks,
            local.elements
        );
        local
    }

    /// Work a self-contained chunk down to the lowest bit, keeping the low
    /// half local and enqueueing the high half at each level.
    fn process_chunk(&self, idx: usize, chunk: Chunk, local: &mut WorkerStats) {
        let Chunk {
            mut start,
            mut end,
            mut bit_no,
            mut up,
            ..
        } = chunk;

        loop {
            let elems = end - start;
            if elems <= self.chunk_thresh {
                local.elements += elems as u64;
                let d = unsafe { self.data.range_mut(start, end) };
                if bit_no == self.highest_bit {
                    radix_sort::<K, E, P>(d, up, self.lowest_bit, self.cmp_thresh);
                } else {
                    radix_recursion_dyn::<K, E, P>(
                        d,
                        bit_no,
                        self.lowest_bit,
                        self.cmp_thresh,
                        up,
                        self.up,
                    );
                }
                return;
            }

            let (split, up_left, up_right) = if self.config.use_slaves
                && elems > self.chunk_slave_thresh
                && self.try_become_master()
            {
                self.master_split(idx, start, end, bit_no, up, local)
            } else {
                local.elements += elems as u64;
                let d = unsafe { self.data.range_mut(start, end) };
                let (split, up_left, up_right) = self.split_level(d, bit_no, up);
                (start + split, up_left, up_right)
            };

            if bit_no == self.lowest_bit {
                return;
            }
            bit_no -= 1;
            self.queue.add_chunk(Chunk {
                start: split,
                end,
                bit_no,
                up: up_right,
                master: None,
            });
            end = split;
            up = up_left;
        }
    }

    /// Partition one bit level of `d`, applying the encoding's direction
    /// table at the top level. Returns the chunk-relative split and the
    /// directions for the two halves.
    fn split_level(&self, d: &mut [E], bit_no: u32, up: bool) -> (usize, bool, bool) {
        if bit_no == self.highest_bit {
            let (up_high, up_left, up_right) = directions::<K>(up);
            (split_once::<E, P>(d, bit_no, up_high), up_left, up_right)
        } else {
            (split_once::<E, P>(d, bit_no, up), up, up)
        }
    }

    /// Claim a master slot unless that would leave no worker free to act
    /// as a slave; with every worker mastering, nobody would ever serve the
    /// queued portions.
    fn try_become_master(&self) -> bool {
        let prev = self.active_masters.fetch_add(1, Ordering::Relaxed);
        if prev + 1 >= self.config.num_threads {
            self.active_masters.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Cooperative single-bit partition of `[start, end)`: enqueue slave
    /// portions, partition the first portion locally, wait for all results
    /// and merge them into one global split.
    fn master_split(
        &self,
        idx: usize,
        start: usize,
        end: usize,
        bit_no: u32,
        up: bool,
        local: &mut WorkerStats,
    ) -> (usize, bool, bool) {
        let elems = end - start;
        let portions = elems / self.chunk_thresh + 1;
        trace!(
            "worker {} mastering [{}, {}) in {} portions at bit {}",
            idx,
            start,
            end,
            portions,
            bit_no
        );

        // The slot must be sized before the first slave chunk is visible.
        self.masters[idx].prepare(portions);

        let portion = elems / portions;
        let first = elems - (portions - 1) * portion;
        let mut slave_start = start + first;
        for slave_idx in 1..portions {
            self.queue.add_chunk(Chunk {
                start: slave_start,
                end: slave_start + portion,
                bit_no,
                up,
                master: Some((idx, slave_idx)),
            });
            slave_start += portion;
        }

        local.elements += first as u64;
        let d = unsafe { self.data.range_mut(start, start + first) };
        let (split, up_left, up_right) = self.split_level(d, bit_no, up);
        self.masters[idx].store(
            0,
            Region {
                start,
                split: start + split,
                end: start + first,
            },
        );

        let mut regions = self.masters[idx].wait_all();
        self.active_masters.fetch_sub(1, Ordering::Relaxed);

        // All portions reported; the whole range is this worker's again.
        for r in &mut regions {
            r.start -= start;
            r.split -= start;
            r.end -= start;
        }
        let d = unsafe { self.data.range_mut(start, end) };
        let split = merge_regions(d, &regions);
        (start + split, up_left, up_right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::config::QueueMode;
    use crate::sorts::recursion::ScalarEngine;
    use nanorand::{Rng, WyRand};

    fn parallel_sort_u32(d: &mut [u32], config: &ThreadConfig, stats: Option<&mut SortStats>) {
        sort_parallel::<u32, u32, ScalarEngine>(config, stats, d, true, 32);
    }

    fn random_u32s(n: usize, seed: u64) -> Vec<u32> {
        let mut rng = WyRand::new_seed(seed);
        (0..n).map(|_| rng.generate()).collect()
    }

    #[test]
    fn matches_sequential_for_all_queue_modes() {
        let input = random_u32s(100_000, 31);
        let mut expected = input.clone();
        expected.sort_unstable();

        for mode in [QueueMode::Fifo, QueueMode::Lifo] {
            let mut config = ThreadConfig::new(4);
            config.queue_mode = mode;
            let mut d = input.clone();
            parallel_sort_u32(&mut d, &config, None);
            assert_eq!(d, expected);
        }
    }

    #[test]
    fn single_worker_sorts() {
        let mut d = random_u32s(10_000, 32);
        let mut expected = d.clone();
        expected.sort_unstable();
        parallel_sort_u32(&mut d, &ThreadConfig::new(1), None);
        assert_eq!(d, expected);
    }

    #[test]
    fn without_slaves_sorts() {
        let mut config = ThreadConfig::new(4);
        config.use_slaves = false;
        let mut d = random_u32s(50_000, 33);
        let mut expected = d.clone();
        expected.sort_unstable();
        parallel_sort_u32(&mut d, &config, None);
        assert_eq!(d, expected);
    }

    #[test]
    fn low_slave_fac_makes_progress() {
        // Every worker wants to master; the fallback must keep at least one
        // worker serving slave portions.
        let mut config = ThreadConfig::new(2);
        config.slave_fac = 0.1;
        let mut d = random_u32s(50_000, 34);
        let mut expected = d.clone();
        expected.sort_unstable();
        parallel_sort_u32(&mut d, &config, None);
        assert_eq!(d, expected);
    }

    #[test]
    fn more_workers_than_elements() {
        let mut d = random_u32s(5, 35);
        let mut expected = d.clone();
        expected.sort_unstable();
        parallel_sort_u32(&mut d, &ThreadConfig::new(8), None);
        assert_eq!(d, expected);
    }

    #[test]
    fn stats_account_for_every_chunk() {
        let mut stats = SortStats::new();
        let mut d = random_u32s(100_000, 36);
        parallel_sort_u32(&mut d, &ThreadConfig::new(4), Some(&mut stats));
        assert_eq!(stats.elements.len(), 4);
        assert_eq!(stats.chunks.len(), 4);
        assert!(stats.chunks.iter().sum::<u64>() > 0);
        assert!(stats.elements.iter().sum::<u64>() >= 100_000);
        assert!(stats.max_queue_len >= 1);
    }

    #[test]
    #[should_panic(expected = "num_threads")]
    fn zero_threads_is_rejected() {
        let mut d = vec![3u32, 1, 2];
        parallel_sort_u32(&mut d, &ThreadConfig::new(0), None);
    }

    #[test]
    fn sorts_signed_and_descending() {
        let mut rng = WyRand::new_seed(37);
        let input: Vec<i64> = (0..30_000).map(|_| rng.generate::<u64>() as i64).collect();

        let mut d = input.clone();
        sort_parallel::<i64, i64, ScalarEngine>(&ThreadConfig::new(4), None, &mut d, false, 32);
        let mut expected = input;
        expected.sort_unstable();
        expected.reverse();
        assert_eq!(d, expected);
    }
}
