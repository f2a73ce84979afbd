//! Linear kernel implementation

use crate::core::FeatureVector;
use crate::kernel::Kernel;

/// Linear kernel: K(x, y) = x^T * y
///
/// Classifiers trained with this kernel collapse their support vectors into a
/// single weight vector, so prediction is one dot product.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearKernel;

impl LinearKernel {
    /// Identifier used in the model header
    pub const NAME: &'static str = "linear";

    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn compute(&self, x: &FeatureVector, y: &FeatureVector) -> f64 {
        x.dot(y)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
