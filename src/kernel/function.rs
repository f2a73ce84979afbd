//! Closed set of supported kernels
//!
//! [`KernelFunction`] is the tagged union the trainer and classifier dispatch
//! on. Each variant carries only the parameters its formula needs.

use crate::core::{FeatureVector, SVMError};
use crate::kernel::{Kernel, LinearKernel, PolynomialKernel, RBFKernel, SigmoidKernel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kernel identifier as written in the model header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelType {
    Linear,
    Poly,
    Rbf,
    Sigmoid,
}

impl KernelType {
    pub const ALL: [KernelType; 4] = [
        KernelType::Linear,
        KernelType::Poly,
        KernelType::Rbf,
        KernelType::Sigmoid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KernelType::Linear => LinearKernel::NAME,
            KernelType::Poly => PolynomialKernel::NAME,
            KernelType::Rbf => RBFKernel::NAME,
            KernelType::Sigmoid => SigmoidKernel::NAME,
        }
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KernelType {
    type Err = SVMError;

    /// Case-insensitive match against the four identifiers
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        KernelType::ALL
            .into_iter()
            .find(|kt| kt.as_str() == lowered)
            .ok_or_else(|| SVMError::InvalidKernel(s.to_string()))
    }
}

/// One of the four supported kernel functions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelFunction {
    Linear(LinearKernel),
    Polynomial(PolynomialKernel),
    Rbf(RBFKernel),
    Sigmoid(SigmoidKernel),
}

impl KernelFunction {
    pub fn linear() -> Self {
        KernelFunction::Linear(LinearKernel::new())
    }

    pub fn polynomial(gamma: f64, coef0: f64, degree: f64) -> Self {
        KernelFunction::Polynomial(PolynomialKernel::new(gamma, coef0, degree))
    }

    pub fn rbf(gamma: f64) -> Self {
        KernelFunction::Rbf(RBFKernel::new(gamma))
    }

    pub fn sigmoid(gamma: f64, coef0: f64) -> Self {
        KernelFunction::Sigmoid(SigmoidKernel::new(gamma, coef0))
    }

    pub fn kernel_type(&self) -> KernelType {
        match self {
            KernelFunction::Linear(_) => KernelType::Linear,
            KernelFunction::Polynomial(_) => KernelType::Poly,
            KernelFunction::Rbf(_) => KernelType::Rbf,
            KernelFunction::Sigmoid(_) => KernelType::Sigmoid,
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, KernelFunction::Linear(_))
    }

    /// Gamma, or 1 for kernels without one
    pub fn gamma(&self) -> f64 {
        match self {
            KernelFunction::Linear(_) => 1.0,
            KernelFunction::Polynomial(k) => k.gamma,
            KernelFunction::Rbf(k) => k.gamma(),
            KernelFunction::Sigmoid(k) => k.gamma,
        }
    }

    /// Independent term, or 0 for kernels without one
    pub fn coef0(&self) -> f64 {
        match self {
            KernelFunction::Polynomial(k) => k.coef0,
            KernelFunction::Sigmoid(k) => k.coef0,
            KernelFunction::Linear(_) | KernelFunction::Rbf(_) => 0.0,
        }
    }

    /// Polynomial degree, or 1 for other kernels
    pub fn degree(&self) -> f64 {
        match self {
            KernelFunction::Polynomial(k) => k.degree,
            _ => 1.0,
        }
    }
}

impl Default for KernelFunction {
    fn default() -> Self {
        Self::linear()
    }
}

impl Kernel for KernelFunction {
    #[inline]
    fn compute(&self, x: &FeatureVector, y: &FeatureVector) -> f64 {
        match self {
            KernelFunction::Linear(k) => k.compute(x, y),
            KernelFunction::Polynomial(k) => k.compute(x, y),
            KernelFunction::Rbf(k) => k.compute(x, y),
            KernelFunction::Sigmoid(k) => k.compute(x, y),
        }
    }

    fn name(&self) -> &'static str {
        self.kernel_type().as_str()
    }
}
