//! Sequential Minimal Optimization (SMO) trainer
//!
//! Solves the two-class soft-margin dual with first-order working set
//! selection after Keerthi et al. (2001): every iteration optimizes the pair
//! formed by the most violating index of the high set and of the low set, and
//! training stops once the duality gap `b_low - b_high` drops below `eps`.
//!
//! The per-example decision values (`fns`) are updated incrementally after
//! each pair step. That update is the only `O(n)` part of an iteration and is
//! split into one contiguous segment per worker, with lengths differing by at
//! most one, over a rayon pool that lives as long as the trainer. Each segment reports its local extrema of the high and low sets,
//! and the segments are merged with ties broken towards the lower index, so
//! the run does not depend on the number of workers.

use crate::cache::{CacheStats, KernelCache};
use crate::classifier::{SupportVector, SvmClassifier};
use crate::core::{FeatureVector, Result, SVMError, TrainerConfig, WorkingSetStrategy};
use crate::kernel::{Kernel, KernelFunction};
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::{Duration, Instant};

/// Numerical floor for alphas, bounds and the curvature `eta`
pub const TAU: f64 = 1e-12;

/// Everything a training run produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub classifier: SvmClassifier,
    /// Final Lagrange multipliers, positives first then negatives
    pub alphas: Vec<f64>,
    pub iterations: usize,
    /// Duality gap `b_low - b_high` at termination
    pub gap: f64,
    pub elapsed: Duration,
    pub cache: CacheStats,
}

/// SMO trainer for a fixed kernel and configuration
///
/// The kernel used during training must compute the same function as the one
/// described by `config.params`, since the classifier is rebuilt from the
/// parameters.
pub struct SmoTrainer<K: Kernel = KernelFunction> {
    kernel: K,
    config: TrainerConfig,
    pool: ThreadPool,
}

impl SmoTrainer<KernelFunction> {
    /// Create a trainer for the kernel described by `config.params`
    pub fn new(config: TrainerConfig) -> Result<Self> {
        let kernel = config.params.make_kernel();
        Self::with_kernel(kernel, config)
    }
}

impl<K: Kernel> SmoTrainer<K> {
    /// Create a trainer evaluating `kernel` during training
    pub fn with_kernel(kernel: K, config: TrainerConfig) -> Result<Self> {
        config.params.validate()?;
        let threads = config.worker_threads()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("smo-worker-{i}"))
            .build()
            .map_err(|e| SVMError::ThreadPool(e.to_string()))?;

        Ok(Self {
            kernel,
            config,
            pool,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Number of worker threads in the pool
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Train on the given positive and negative examples.
    ///
    /// Returns `Ok(None)` when either class is empty.
    pub fn train(
        &self,
        pos: &[FeatureVector],
        neg: &[FeatureVector],
    ) -> Result<Option<SvmClassifier>> {
        Ok(self
            .train_detailed(pos, neg)?
            .map(|outcome| outcome.classifier))
    }

    /// Train and report the final multipliers and run statistics
    pub fn train_detailed(
        &self,
        pos: &[FeatureVector],
        neg: &[FeatureVector],
    ) -> Result<Option<TrainingOutcome>> {
        if pos.is_empty() || neg.is_empty() {
            warn!(
                "Skipping training: {} positive and {} negative examples",
                pos.len(),
                neg.len()
            );
            return Ok(None);
        }
        let dims = check_dimensions(pos, neg)?;

        let start = Instant::now();
        let cache = KernelCache::new(&self.kernel, pos.len() + neg.len());
        let mut state = SmoState::new(pos, neg, self.config.params.cost());
        let mut iterations = 0;

        info!(
            "Training {} kernel SMO on {} positive and {} negative examples ({} threads)",
            self.kernel.name(),
            pos.len(),
            neg.len(),
            self.threads()
        );

        while state.gap() >= self.config.params.eps() {
            if let Some(max) = self.config.max_iterations {
                if iterations >= max {
                    warn!(
                        "Stopping after {iterations} iterations with duality gap {:.6}",
                        state.gap()
                    );
                    return Err(SVMError::NotConverged {
                        iterations,
                        gap: state.gap(),
                    });
                }
            }
            iterations += 1;

            let i = state.i_high;
            let j = match self.config.working_set_strategy {
                WorkingSetStrategy::FirstOrder => state.i_low,
                WorkingSetStrategy::SecondOrder => self.second_order_partner(&state, &cache, i),
            };

            if self.config.log_interval > 0 && iterations % self.config.log_interval == 0 {
                debug!(
                    "{iterations:>8}  b_high {:>12.6}  b_low {:>12.6}  gap {:>10.6}  i {i} ({:+})  j {j} ({:+})",
                    state.b_high,
                    state.b_low,
                    state.gap(),
                    state.labels[i],
                    state.labels[j]
                );
            }

            let (delta_i, delta_j) = state.optimise(&cache, i, j);
            state.update_index_sets(i);
            state.update_index_sets(j);
            if !self.update_predictions(&mut state, &cache, (i, delta_i), (j, delta_j)) {
                warn!("Kernel produced non-finite values at iteration {iterations}");
                return Err(SVMError::InvalidParameter(format!(
                    "{} kernel produced non-finite values at iteration {iterations}",
                    self.kernel.name()
                )));
            }
        }

        let threshold = state.threshold();
        let elapsed = start.elapsed();
        let support = state.support_vectors();
        let stats = cache.stats();

        info!(
            "Converged after {iterations} iterations in {} ms: {} support vectors, cache hit rate {:.1}%",
            elapsed.as_millis(),
            support.len(),
            stats.hit_rate() * 100.0
        );

        let classifier = SvmClassifier::from_support_vectors(
            self.config.params,
            threshold,
            pos.len(),
            neg.len(),
            dims,
            support,
        );

        Ok(Some(TrainingOutcome {
            classifier,
            gap: state.gap(),
            alphas: state.alphas,
            iterations,
            elapsed,
            cache: stats,
        }))
    }

    /// Apply the pair step to every decision value and recompute the extrema
    /// of the high and low sets in one parallel pass.
    ///
    /// Returns `false` if any decision value is no longer finite.
    fn update_predictions(
        &self,
        state: &mut SmoState<'_>,
        cache: &KernelCache<'_, K>,
        (i, delta_i): (usize, f64),
        (j, delta_j): (usize, f64),
    ) -> bool {
        let scale_i = delta_i * state.labels[i];
        let scale_j = delta_j * state.labels[j];

        let SmoState {
            xs,
            fns,
            in_high,
            in_low,
            ..
        } = &mut *state;
        let (xs, in_high, in_low) = (&*xs, &*in_high, &*in_low);
        let (xi, xj) = (xs[i], xs[j]);

        let segments = split_segments(fns, self.threads());

        let (high, low, finite) = self.pool.install(|| {
            segments
                .into_par_iter()
                .map(|(offset, chunk)| {
                    let mut high = Extremum::default();
                    let mut low = Extremum::default();
                    let mut finite = true;
                    for (k, f) in (offset..).zip(chunk.iter_mut()) {
                        *f += scale_i * cache.value(i, xi, k, xs[k])
                            + scale_j * cache.value(j, xj, k, xs[k]);
                        finite &= f.is_finite();
                        if in_high[k] {
                            high.offer_min(*f, k);
                        }
                        if in_low[k] {
                            low.offer_max(*f, k);
                        }
                    }
                    (high, low, finite)
                })
                .reduce(
                    || (Extremum::default(), Extremum::default(), true),
                    |(h1, l1, f1), (h2, l2, f2)| (h1.merge_min(h2), l1.merge_max(l2), f1 && f2),
                )
        });

        match high.0 {
            Some((value, k)) => {
                state.b_high = value;
                state.i_high = k;
            }
            None => state.b_high = f64::INFINITY,
        }
        match low.0 {
            Some((value, k)) => {
                state.b_low = value;
                state.i_low = k;
            }
            None => state.b_low = f64::NEG_INFINITY,
        }
        finite
    }

    /// Low-set partner of `i` with the largest second-order gain
    /// `(f_i - f_t)^2 / eta` among those with `f_i < f_t` (Fan et al. 2005)
    fn second_order_partner(
        &self,
        state: &SmoState<'_>,
        cache: &KernelCache<'_, K>,
        i: usize,
    ) -> usize {
        let xs = &state.xs;
        let f_i = state.fns[i];
        let k_ii = cache.value(i, xs[i], i, xs[i]);

        let best = self.pool.install(|| {
            (0..state.len())
                .into_par_iter()
                .filter(|&t| state.in_low[t] && f_i < state.fns[t])
                .map(|t| {
                    let eta = (k_ii + cache.value(t, xs[t], t, xs[t])
                        - 2.0 * cache.value(i, xs[i], t, xs[t]))
                    .max(TAU);
                    let diff = f_i - state.fns[t];
                    let mut gain = Extremum::default();
                    gain.offer_max(diff * diff / eta, t);
                    gain
                })
                .reduce(Extremum::default, Extremum::merge_max)
        });

        best.0.map(|(_, t)| t).unwrap_or(state.i_low)
    }
}

/// Split `values` into `workers` contiguous segments whose lengths differ by at
/// most one, tagged with their starting offset. Never yields more segments than
/// values.
fn split_segments(values: &mut [f64], workers: usize) -> Vec<(usize, &mut [f64])> {
    let workers = workers.clamp(1, values.len().max(1));
    let (base, rem) = (values.len() / workers, values.len() % workers);

    let mut rest = values;
    let mut offset = 0;
    let mut segments = Vec::with_capacity(workers);
    for s in 0..workers {
        let len = base + usize::from(s < rem);
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
        segments.push((offset, head));
        offset += len;
        rest = tail;
    }
    segments
}

/// Validate that all vectors share one non-zero length and return it
fn check_dimensions(pos: &[FeatureVector], neg: &[FeatureVector]) -> Result<usize> {
    let dims = pos[0].len();
    if dims == 0 {
        return Err(SVMError::InvalidDataset(
            "Feature vectors must not be empty".to_string(),
        ));
    }
    match pos.iter().chain(neg).find(|x| x.len() != dims) {
        Some(x) => Err(SVMError::DimensionMismatch {
            expected: dims,
            actual: x.len(),
        }),
        None => Ok(dims),
    }
}

/// Running extremum `(value, index)`; ties go to the lower index
#[derive(Debug, Clone, Copy, Default)]
struct Extremum(Option<(f64, usize)>);

impl Extremum {
    fn offer_min(&mut self, value: f64, index: usize) {
        *self = self.merge_min(Extremum(Some((value, index))));
    }

    fn offer_max(&mut self, value: f64, index: usize) {
        *self = self.merge_max(Extremum(Some((value, index))));
    }

    fn merge_min(self, other: Extremum) -> Extremum {
        match (self.0, other.0) {
            (Some((a, ia)), Some((b, ib))) => {
                if b < a || (b == a && ib < ia) {
                    other
                } else {
                    self
                }
            }
            (None, _) => other,
            (_, None) => self,
        }
    }

    fn merge_max(self, other: Extremum) -> Extremum {
        match (self.0, other.0) {
            (Some((a, ia)), Some((b, ib))) => {
                if b > a || (b == a && ib < ia) {
                    other
                } else {
                    self
                }
            }
            (None, _) => other,
            (_, None) => self,
        }
    }
}

/// Mutable state of one training run
struct SmoState<'a> {
    xs: Vec<&'a FeatureVector>,
    labels: Vec<f64>,
    alphas: Vec<f64>,
    fns: Vec<f64>,
    in_high: Vec<bool>,
    in_low: Vec<bool>,
    cost: f64,
    b_high: f64,
    b_low: f64,
    i_high: usize,
    i_low: usize,
}

impl<'a> SmoState<'a> {
    fn new(pos: &'a [FeatureVector], neg: &'a [FeatureVector], cost: f64) -> Self {
        let xs: Vec<&FeatureVector> = pos.iter().chain(neg).collect();
        let labels: Vec<f64> = std::iter::repeat(1.0)
            .take(pos.len())
            .chain(std::iter::repeat(-1.0).take(neg.len()))
            .collect();
        let fns = labels.iter().map(|y| -y).collect();
        let in_high = labels.iter().map(|&y| y > 0.0).collect();
        let in_low = labels.iter().map(|&y| y < 0.0).collect();

        Self {
            alphas: vec![0.0; xs.len()],
            xs,
            labels,
            fns,
            in_high,
            in_low,
            cost,
            b_high: -1.0,
            b_low: 1.0,
            i_high: 0,
            i_low: pos.len(),
        }
    }

    fn len(&self) -> usize {
        self.xs.len()
    }

    fn gap(&self) -> f64 {
        self.b_low - self.b_high
    }

    fn clip(&self, a: f64) -> f64 {
        if a > self.cost - TAU {
            self.cost
        } else if a < TAU {
            0.0
        } else {
            a
        }
    }

    /// Analytic two-variable step; returns the alpha changes of `i` and `j`
    fn optimise<K: Kernel>(
        &mut self,
        cache: &KernelCache<'_, K>,
        i: usize,
        j: usize,
    ) -> (f64, f64) {
        let (xi, xj) = (self.xs[i], self.xs[j]);
        let (yi, yj) = (self.labels[i], self.labels[j]);
        let (old_i, old_j) = (self.alphas[i], self.alphas[j]);

        let eta = (cache.value(i, xi, i, xi) + cache.value(j, xj, j, xj)
            - 2.0 * cache.value(i, xi, j, xj))
        .max(TAU);

        let mut a_j = self.clip(old_j + yj * (self.fns[i] - self.fns[j]) / eta);
        let a_i = self.clip(old_i + yi * yj * (old_j - a_j));
        a_j = self.clip(old_j + yi * yj * (old_i - a_i));

        self.alphas[i] = a_i;
        self.alphas[j] = a_j;
        (a_i - old_i, a_j - old_j)
    }

    fn update_index_sets(&mut self, k: usize) {
        let a = self.alphas[k];
        let positive = self.labels[k] > 0.0;
        let below_cost = a < self.cost;
        let above_zero = a > 0.0;
        self.in_high[k] = (below_cost && positive) || (above_zero && !positive);
        self.in_low[k] = (above_zero && positive) || (below_cost && !positive);
    }

    /// Midpoint of the final bounds, or whichever bound is still finite
    fn threshold(&self) -> f64 {
        match (self.b_high.is_finite(), self.b_low.is_finite()) {
            (true, true) => (self.b_low + self.b_high) / 2.0,
            (true, false) => self.b_high,
            (false, true) => self.b_low,
            (false, false) => 0.0,
        }
    }

    fn support_vectors(&self) -> Vec<SupportVector> {
        self.alphas
            .iter()
            .zip(&self.labels)
            .zip(&self.xs)
            .filter(|((a, _), _)| **a > TAU)
            .map(|((&a, &y), &x)| SupportVector::new(a * y, x.clone()))
            .collect()
    }
}
