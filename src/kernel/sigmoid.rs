//! Sigmoid (Tanh) Kernel Implementation
//!
//! K(x, y) = tanh(γ * <x, y> + r)
//!
//! The kernel is not positive semi-definite for every choice of γ and r, so
//! the pairwise `eta` term of an SMO step can vanish or turn negative. The
//! trainer floors `eta` to a small positive value in that case.

use crate::core::FeatureVector;
use crate::kernel::traits::Kernel;

/// Sigmoid (Hyperbolic Tangent) kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidKernel {
    /// Scaling parameter for the dot product (must be positive)
    pub gamma: f64,
    /// Bias/offset parameter (can be positive, negative, or zero)
    pub coef0: f64,
}

impl SigmoidKernel {
    /// Identifier used in the model header
    pub const NAME: &'static str = "sigmoid";

    /// Creates a new Sigmoid kernel with specified parameters
    ///
    /// # Panics
    /// Panics if gamma is not positive
    ///
    /// # Examples
    /// ```
    /// use rsmo::kernel::SigmoidKernel;
    ///
    /// let kernel = SigmoidKernel::new(0.1, -1.0);
    /// assert_eq!(kernel.gamma, 0.1);
    /// assert_eq!(kernel.coef0, -1.0);
    /// ```
    pub fn new(gamma: f64, coef0: f64) -> Self {
        if gamma <= 0.0 {
            panic!("Gamma must be positive, got: {}", gamma);
        }
        Self { gamma, coef0 }
    }
}

impl Default for SigmoidKernel {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Kernel for SigmoidKernel {
    fn compute(&self, x: &FeatureVector, y: &FeatureVector) -> f64 {
        (self.gamma * x.dot(y) + self.coef0).tanh()
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
    fn test_sigmoid_kernel_computation() {
        let kernel = SigmoidKernel::new(0.5, -1.0);

        let x = FeatureVector::new(vec![1.0, 2.0]);
        let y = FeatureVector::new(vec![3.0, 1.0]);

        // tanh(0.5 * 5 - 1) = tanh(1.5)
        assert_relative_eq!(kernel.compute(&x, &y), 1.5f64.tanh(), epsilon = 1e-12);
        assert_eq!(kernel.name(), "sigmoid");
    }

    #[test]
    fn test_sigmoid_kernel_range() {
        let kernel = SigmoidKernel::default();

        let x = FeatureVector::new(vec![50.0]);
        let y = FeatureVector::new(vec![-50.0]);

        let value = kernel.compute(&x, &y);
        assert!((-1.0..=1.0).contains(&value));
        assert_relative_eq!(value, -1.0, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "Gamma must be positive")]
    fn test_sigmoid_kernel_invalid_gamma() {
        SigmoidKernel::new(0.0, 1.0);
    }
}
