//! Kernel cache implementation
//!
//! Memoizes kernel values for one training run. Kernel matrices are
//! symmetric, so one slot is kept per unordered pair `(i, j)` including the
//! diagonal: `n * (n + 1) / 2` slots in a packed lower triangle.
//!
//! The cache is shared by the worker threads of the parallel update. Each
//! slot carries a small state machine (empty -> computing -> ready) advanced
//! with compare-and-set, so the kernel is evaluated exactly once per pair even
//! when two workers miss on the same pair at the same time. The loser of the
//! race spins until the winner publishes the value. If the kernel panics, the
//! slot goes back to empty and the next request evaluates it again.

use crate::core::FeatureVector;
use crate::kernel::Kernel;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

const EMPTY: u8 = 0;
const COMPUTING: u8 = 1;
const READY: u8 = 2;

/// Index of the unordered pair `(i, j)` in the packed triangle
#[inline]
fn slot(i: usize, j: usize) -> usize {
    let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
    hi * (hi + 1) / 2 + lo
}

/// Symmetric kernel value cache over a fixed number of training examples
pub struct KernelCache<'k, K: Kernel> {
    kernel: &'k K,
    size: usize,
    values: Vec<AtomicU64>,
    states: Vec<AtomicU8>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<'k, K: Kernel> KernelCache<'k, K> {
    /// Create an empty cache for `size` training examples
    pub fn new(kernel: &'k K, size: usize) -> Self {
        let capacity = size * (size + 1) / 2;
        Self {
            kernel,
            size,
            values: (0..capacity).map(|_| AtomicU64::new(0)).collect(),
            states: (0..capacity).map(|_| AtomicU8::new(EMPTY)).collect(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Kernel value for training examples `i` and `j`.
    ///
    /// `xi` and `xj` must be the vectors at those indices; they are only read
    /// on the first request for the pair.
    ///
    /// # Panics
    /// Panics if `i` or `j` is not below the cache size
    pub fn value(&self, i: usize, xi: &FeatureVector, j: usize, xj: &FeatureVector) -> f64 {
        assert!(
            i < self.size && j < self.size,
            "Cache index ({i}, {j}) out of range for size {}",
            self.size
        );
        let idx = slot(i, j);
        let state = &self.states[idx];

        if state.load(Ordering::Acquire) == READY {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return f64::from_bits(self.values[idx].load(Ordering::Acquire));
        }

        loop {
            match state.compare_exchange(EMPTY, COMPUTING, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => {
                    let release = ReleaseOnUnwind(state);
                    let value = self.kernel.compute(xi, xj);
                    self.values[idx].store(value.to_bits(), Ordering::Release);
                    state.store(READY, Ordering::Release);
                    std::mem::forget(release);
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return value;
                }
                Err(READY) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return f64::from_bits(self.values[idx].load(Ordering::Acquire));
                }
                // Another worker owns the evaluation
                Err(_) => std::hint::spin_loop(),
            }
        }
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let misses = self.misses.load(Ordering::Relaxed);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses,
            capacity: self.values.len(),
            size: misses as usize,
        }
    }
}

/// Returns a slot to `EMPTY` when the kernel evaluation unwinds, so waiting
/// workers take over instead of spinning forever
struct ReleaseOnUnwind<'a>(&'a AtomicU8);

impl Drop for ReleaseOnUnwind<'_> {
    fn drop(&mut self) {
        self.0.store(EMPTY, Ordering::Release);
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of slots, one per unordered pair
    pub capacity: usize,
    /// Number of populated slots
    pub size: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
