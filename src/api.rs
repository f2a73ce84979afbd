//! High-level API for training SMO classifiers
//!
//! # Quick Start
//!
//! ```rust
//! use rsmo::api::Svm;
//! use rsmo::{FeatureVector, KernelFunction};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pos = vec![FeatureVector::new(vec![2.0, 2.0]), FeatureVector::new(vec![1.5, 2.5])];
//! let neg = vec![FeatureVector::new(vec![-2.0, -2.0]), FeatureVector::new(vec![-2.5, -1.5])];
//!
//! let model = Svm::new()
//!     .with_cost(1.0)
//!     .with_epsilon(1e-3)
//!     .with_kernel(KernelFunction::linear())
//!     .train(&pos, &neg)?
//!     .expect("both classes are present");
//!
//! assert!(model.predict(&FeatureVector::new(vec![1.0, 1.0])) > 0.0);
//! # Ok(())
//! # }
//! ```

use crate::classifier::SvmClassifier;
use crate::core::{
    FeatureVector, Prediction, Result, SvmParams, TrainerConfig, WorkingSetStrategy,
};
use crate::kernel::KernelFunction;
use crate::solver::{SmoTrainer, TrainingOutcome};

/// Train with `params` on all available cores.
///
/// Returns `Ok(None)` when either class is empty.
pub fn train(
    pos: &[FeatureVector],
    neg: &[FeatureVector],
    params: &SvmParams,
) -> Result<Option<SvmClassifier>> {
    SmoTrainer::new(TrainerConfig::new(*params))?.train(pos, neg)
}

/// SMO trainer builder
#[derive(Debug, Clone)]
pub struct Svm {
    cost: f64,
    eps: f64,
    kernel: KernelFunction,
    threads: Option<usize>,
    max_iterations: Option<usize>,
    working_set_strategy: WorkingSetStrategy,
    log_interval: usize,
}

impl Svm {
    /// Linear kernel with default parameters
    pub fn new() -> Self {
        let params = SvmParams::default();
        let config = TrainerConfig::default();
        Self {
            cost: params.cost(),
            eps: params.eps(),
            kernel: params.make_kernel(),
            threads: config.threads,
            max_iterations: config.max_iterations,
            working_set_strategy: config.working_set_strategy,
            log_interval: config.log_interval,
        }
    }

    /// Set regularization parameter C
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Set convergence tolerance
    pub fn with_epsilon(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_kernel(mut self, kernel: KernelFunction) -> Self {
        self.kernel = kernel;
        self
    }

    /// Set the number of worker threads
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set maximum number of iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_working_set_strategy(mut self, strategy: WorkingSetStrategy) -> Self {
        self.working_set_strategy = strategy;
        self
    }

    /// Iterations between convergence log lines (0 disables them)
    pub fn with_log_interval(mut self, log_interval: usize) -> Self {
        self.log_interval = log_interval;
        self
    }

    /// Validate the settings and assemble the trainer configuration
    pub fn config(&self) -> Result<TrainerConfig> {
        let params = SvmParams::with_kernel(self.cost, self.eps, &self.kernel)?;
        Ok(TrainerConfig {
            params,
            threads: self.threads,
            max_iterations: self.max_iterations,
            working_set_strategy: self.working_set_strategy,
            log_interval: self.log_interval,
        })
    }

    /// Build a reusable trainer
    pub fn build(&self) -> Result<SmoTrainer> {
        SmoTrainer::with_kernel(self.kernel, self.config()?)
    }

    pub fn train(
        &self,
        pos: &[FeatureVector],
        neg: &[FeatureVector],
    ) -> Result<Option<SvmClassifier>> {
        self.build()?.train(pos, neg)
    }

    pub fn train_detailed(
        &self,
        pos: &[FeatureVector],
        neg: &[FeatureVector],
    ) -> Result<Option<TrainingOutcome>> {
        self.build()?.train_detailed(pos, neg)
    }
}

impl Default for Svm {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a linear classifier with cost `c` and default tolerance
    pub fn train_linear(
        pos: &[FeatureVector],
        neg: &[FeatureVector],
        c: f64,
    ) -> Result<Option<SvmClassifier>> {
        Svm::new().with_cost(c).train(pos, neg)
    }

    /// Fraction of examples placed on the correct side of the decision boundary
    pub fn accuracy(model: &SvmClassifier, pos: &[FeatureVector], neg: &[FeatureVector]) -> f64 {
        let total = pos.len() + neg.len();
        if total == 0 {
            return 0.0;
        }
        let positives = |samples: &[FeatureVector]| {
            model
                .predict_batch(samples)
                .into_iter()
                .map(Prediction::from_score)
                .filter(|p| p.is_positive())
                .count()
        };
        let correct = positives(pos) + (neg.len() - positives(neg));
        correct as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SVMError;
    use crate::kernel::KernelType;

    fn fv(values: &[f64]) -> FeatureVector {
        FeatureVector::from(values)
    }

    fn separable() -> (Vec<FeatureVector>, Vec<FeatureVector>) {
        let pos = vec![fv(&[2.0]), fv(&[1.5]), fv(&[1.8])];
        let neg = vec![fv(&[-2.0]), fv(&[-1.5]), fv(&[-1.8])];
        (pos, neg)
    }

    #[test]
    fn test_svm_builder_pattern() {
        let svm = Svm::new()
            .with_cost(2.0)
            .with_epsilon(0.01)
            .with_kernel(KernelFunction::rbf(0.5))
            .with_threads(2)
            .with_max_iterations(5000)
            .with_working_set_strategy(WorkingSetStrategy::SecondOrder);

        let config = svm.config().expect("valid settings");
        assert_eq!(config.params.cost(), 2.0);
        assert_eq!(config.params.eps(), 0.01);
        assert_eq!(config.params.kernel_type(), KernelType::Rbf);
        assert_eq!(config.params.gamma(), 0.5);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.max_iterations, Some(5000));
        assert_eq!(config.working_set_strategy, WorkingSetStrategy::SecondOrder);
    }

    #[test]
    fn test_builder_rejects_bad_cost() {
        let result = Svm::new().with_cost(-1.0).train(&[fv(&[1.0])], &[fv(&[-1.0])]);
        assert!(matches!(result, Err(SVMError::InvalidParameter(_))));
    }

    #[test]
    fn test_quick_training() {
        let (pos, neg) = separable();
        let model = quick::train_linear(&pos, &neg, 1.0)
            .expect("Training should succeed")
            .expect("both classes present");

        assert!(model.predict(&fv(&[1.0])) > 0.0);
        assert!(model.predict(&fv(&[-1.0])) < 0.0);
        assert_eq!(quick::accuracy(&model, &pos, &neg), 1.0);
    }

    #[test]
    fn test_static_train_matches_builder() {
        let (pos, neg) = separable();
        let params = SvmParams::linear(1.0, 1e-4).expect("valid params");
        let a = train(&pos, &neg, &params)
            .expect("Training should succeed")
            .expect("both classes present");
        let b = Svm::new()
            .with_threads(1)
            .train(&pos, &neg)
            .expect("Training should succeed")
            .expect("both classes present");

        assert_eq!(a.params(), b.params());
        assert_eq!(a.threshold(), b.threshold());
        assert_eq!(a.linear_weights(), b.linear_weights());
    }
}
