//! Kernel trait definition

use crate::core::FeatureVector;

/// Kernel function trait
///
/// A kernel function K(x, y) is a pure similarity measure between two feature
/// vectors of identical length. Implementations must be stateless with respect
/// to the values they return, since the trainer memoizes them.
///
/// # Panics
/// A panicking `compute` aborts the training run. The cache slot being
/// evaluated is released again, so other workers do not wait on it.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &FeatureVector, y: &FeatureVector) -> f64;

    /// Stable identifier used in the model header
    fn name(&self) -> &'static str;
}

impl<K: Kernel + ?Sized> Kernel for &K {
    fn compute(&self, x: &FeatureVector, y: &FeatureVector) -> f64 {
        (**self).compute(x, y)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
