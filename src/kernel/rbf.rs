//! RBF (Radial Basis Function) kernel implementation
//!
//! The RBF kernel is defined as: K(x, y) = exp(-γ * ||x - y||²)
//! where γ (gamma) is a hyperparameter that controls the kernel width.

use crate::core::FeatureVector;
use crate::kernel::Kernel;

/// RBF (Gaussian) kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// The gamma parameter controls the "reach" of each training example:
/// - High gamma: close points have high influence (potential overfitting)
/// - Low gamma: distant points have influence (potential underfitting)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// Identifier used in the model header
    pub const NAME: &'static str = "rbf";

    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RBFKernel {
    /// Default RBF kernel with gamma = 1.0
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, x: &FeatureVector, y: &FeatureVector) -> f64 {
        (-self.gamma * x.squared_distance(y)).exp()
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rbf_kernel_creation() {
        let kernel = RBFKernel::new(0.5);
        assert_eq!(kernel.gamma(), 0.5);

        assert_eq!(RBFKernel::default().gamma(), 1.0);
    }

    #[test]
    #[should_panic(expected = "Gamma must be positive")]
    fn test_rbf_kernel_invalid_gamma() {
        RBFKernel::new(-0.5);
    }

    #[test]
    fn test_rbf_kernel_identical_vectors() {
        let kernel = RBFKernel::new(2.0);
        let x = FeatureVector::new(vec![1.0, -2.0, 3.0]);

        assert_eq!(kernel.compute(&x, &x), 1.0);
    }

    #[test]
    fn test_rbf_kernel_computation() {
        let kernel = RBFKernel::new(0.5);

        let x = FeatureVector::new(vec![1.0, 0.0]);
        let y = FeatureVector::new(vec![0.0, 1.0]);

        // ||x - y||² = 2, so K = exp(-0.5 * 2) = exp(-1)
        assert_relative_eq!(kernel.compute(&x, &y), (-1.0f64).exp(), epsilon = 1e-12);
        assert_eq!(kernel.compute(&x, &y), kernel.compute(&y, &x));
    }

    #[test]
    fn test_rbf_kernel_bounded() {
        let kernel = RBFKernel::new(1.0);

        let x = FeatureVector::new(vec![100.0, 100.0]);
        let y = FeatureVector::new(vec![-100.0, -100.0]);

        let value = kernel.compute(&x, &y);
        assert!((0.0..=1.0).contains(&value));
        assert!(value < 1e-100);
    }
}
