//! Polynomial Kernel Implementation
//!
//! The polynomial kernel is defined as:
//! K(x, y) = (γ * <x, y> + r)^d
//!
//! Where:
//! - γ (gamma): scaling factor for the dot product
//! - r (coef0): independent term in the polynomial
//! - d (degree): degree of the polynomial
//!
//! The degree is stored as a real number because it is persisted that way in
//! the model header. Integral degrees are evaluated with integer powers so a
//! negative base stays real.

use crate::core::FeatureVector;
use crate::kernel::traits::Kernel;

/// Polynomial kernel with configurable degree, gamma, and coefficient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialKernel {
    /// Scaling factor for the dot product
    pub gamma: f64,
    /// Independent term in the polynomial
    pub coef0: f64,
    /// Degree of the polynomial
    pub degree: f64,
}

impl PolynomialKernel {
    /// Identifier used in the model header
    pub const NAME: &'static str = "poly";

    /// Creates a new polynomial kernel with the specified parameters
    ///
    /// # Panics
    /// Panics if `gamma` or `degree` is not positive
    ///
    /// # Examples
    /// ```
    /// use rsmo::kernel::{Kernel, PolynomialKernel};
    /// use rsmo::FeatureVector;
    ///
    /// // Quadratic kernel: (x·y + 1)²
    /// let kernel = PolynomialKernel::new(1.0, 1.0, 2.0);
    /// let x = FeatureVector::new(vec![1.0, 2.0]);
    /// let y = FeatureVector::new(vec![2.0, 1.0]);
    /// assert_eq!(kernel.compute(&x, &y), 25.0);
    /// ```
    pub fn new(gamma: f64, coef0: f64, degree: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {gamma}");
        assert!(degree > 0.0, "Polynomial degree must be positive, got: {degree}");

        Self {
            gamma,
            coef0,
            degree,
        }
    }
}

impl Default for PolynomialKernel {
    /// Matches the linear kernel: gamma = 1, coef0 = 0, degree = 1
    fn default() -> Self {
        Self::new(1.0, 0.0, 1.0)
    }
}

impl Kernel for PolynomialKernel {
    fn compute(&self, x: &FeatureVector, y: &FeatureVector) -> f64 {
        let base = self.gamma * x.dot(y) + self.coef0;

        if self.degree.fract() == 0.0 && self.degree <= i32::MAX as f64 {
            base.powi(self.degree as i32)
        } else {
            base.powf(self.degree)
        }
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
