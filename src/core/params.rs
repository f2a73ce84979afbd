//! Training hyperparameters and trainer configuration

use crate::core::{Result, SVMError, WorkingSetStrategy};
use crate::kernel::{KernelFunction, KernelType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hyperparameters that define a trained classifier.
///
/// These are persisted in the model header. The kernel parameters are only
/// meaningful for the kernels that use them:
///
/// - `poly`: `(gamma * <x1,x2> + coef0)^degree`
/// - `rbf`: `exp(-gamma * ||x1 - x2||^2)`
/// - `sigmoid`: `tanh(gamma * <x1,x2> + coef0)`
///
/// For `linear` they are carried along but ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvmParams {
    cost: f64,
    eps: f64,
    kernel: KernelType,
    gamma: f64,
    coef0: f64,
    degree: f64,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            cost: 1.0,
            eps: 1e-4,
            kernel: KernelType::Linear,
            gamma: 1.0,
            coef0: 0.0,
            degree: 1.0,
        }
    }
}

impl SvmParams {
    /// Create parameters from a kernel type name.
    ///
    /// The kernel name must be one of `linear`, `poly`, `rbf` or `sigmoid`;
    /// anything else fails with [`SVMError::InvalidKernel`].
    pub fn new(
        cost: f64,
        eps: f64,
        kernel: &str,
        gamma: f64,
        coef0: f64,
        degree: f64,
    ) -> Result<Self> {
        let kernel = kernel.parse::<KernelType>()?;
        Self::from_parts(cost, eps, kernel, gamma, coef0, degree)
    }

    /// Create parameters from an already resolved kernel type
    pub fn from_parts(
        cost: f64,
        eps: f64,
        kernel: KernelType,
        gamma: f64,
        coef0: f64,
        degree: f64,
    ) -> Result<Self> {
        let params = Self {
            cost,
            eps,
            kernel,
            gamma,
            coef0,
            degree,
        };
        params.validate()?;
        Ok(params)
    }

    /// Linear kernel parameters
    pub fn linear(cost: f64, eps: f64) -> Result<Self> {
        Self::from_parts(cost, eps, KernelType::Linear, 1.0, 0.0, 1.0)
    }

    /// Capture the parameters of an existing kernel function
    pub fn with_kernel(cost: f64, eps: f64, kernel: &KernelFunction) -> Result<Self> {
        Self::from_parts(
            cost,
            eps,
            kernel.kernel_type(),
            kernel.gamma(),
            kernel.coef0(),
            kernel.degree(),
        )
    }

    /// Parse the compact form `"<cost> <eps> <kernel> [gamma [coef0 [degree]]]"`,
    /// e.g. `"1 1e-4 linear 1 0 1"`.
    pub fn from_spec(spec: &str) -> Result<Self> {
        let tokens: Vec<&str> = spec.split_whitespace().collect();
        if tokens.len() < 3 || tokens.len() > 6 {
            return Err(SVMError::ParseError(format!(
                "Expected 3 to 6 fields in parameter spec, got {}: \"{spec}\"",
                tokens.len()
            )));
        }

        let number = |idx: usize, default: f64| -> Result<f64> {
            match tokens.get(idx) {
                Some(token) => token.parse::<f64>().map_err(|_| {
                    SVMError::ParseError(format!("Invalid number \"{token}\" in parameter spec"))
                }),
                None => Ok(default),
            }
        };

        let cost = number(0, 1.0)?;
        let eps = number(1, 1e-4)?;
        let gamma = number(3, 1.0)?;
        let coef0 = number(4, 0.0)?;
        let degree = number(5, 1.0)?;
        Self::new(cost, eps, tokens[2], gamma, coef0, degree)
    }

    /// Inverse of [`SvmParams::from_spec`]
    pub fn to_spec(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.cost,
            self.eps,
            self.kernel.as_str(),
            self.gamma,
            self.coef0,
            self.degree
        )
    }

    /// Check every value against its allowed range
    pub fn validate(&self) -> Result<()> {
        if !(self.cost.is_finite() && self.cost > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "Cost must be positive and finite, got: {}",
                self.cost
            )));
        }
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "Convergence tolerance must be positive and finite, got: {}",
                self.eps
            )));
        }
        for (name, value) in [
            ("gamma", self.gamma),
            ("coef0", self.coef0),
            ("degree", self.degree),
        ] {
            if !value.is_finite() {
                return Err(SVMError::InvalidParameter(format!(
                    "Kernel parameter {name} must be finite, got: {value}"
                )));
            }
        }
        if self.kernel != KernelType::Linear && self.gamma <= 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Gamma must be positive for the {} kernel, got: {}",
                self.kernel, self.gamma
            )));
        }
        if self.kernel == KernelType::Poly && self.degree <= 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Polynomial degree must be positive, got: {}",
                self.degree
            )));
        }
        Ok(())
    }

    /// Build the kernel function these parameters describe
    pub fn make_kernel(&self) -> KernelFunction {
        match self.kernel {
            KernelType::Linear => KernelFunction::linear(),
            KernelType::Poly => KernelFunction::polynomial(self.gamma, self.coef0, self.degree),
            KernelType::Rbf => KernelFunction::rbf(self.gamma),
            KernelType::Sigmoid => KernelFunction::sigmoid(self.gamma, self.coef0),
        }
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn kernel_type(&self) -> KernelType {
        self.kernel
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn coef0(&self) -> f64 {
        self.coef0
    }

    pub fn degree(&self) -> f64 {
        self.degree
    }

    pub fn is_linear(&self) -> bool {
        self.kernel == KernelType::Linear
    }
}

/// Writes the parameter block of the model header
impl fmt::Display for SvmParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SVM_COST: {}", self.cost)?;
        writeln!(f, "SVM_EPS: {}", self.eps)?;
        writeln!(f, "KERNEL: {}", self.kernel)?;
        writeln!(f, "GAMMA: {}", self.gamma)?;
        writeln!(f, "COEF0: {}", self.coef0)?;
        writeln!(f, "DEGREE: {}", self.degree)
    }
}

/// Configuration for a training run
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Hyperparameters recorded in the trained classifier
    pub params: SvmParams,
    /// Worker threads for the decision-value update (`None` = all cores)
    pub threads: Option<usize>,
    /// Abort with [`SVMError::NotConverged`] after this many iterations
    pub max_iterations: Option<usize>,
    /// Working set selection heuristic
    pub working_set_strategy: WorkingSetStrategy,
    /// Iterations between convergence log lines
    pub log_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            params: SvmParams::default(),
            threads: None,
            max_iterations: None,
            working_set_strategy: WorkingSetStrategy::FirstOrder,
            log_interval: 100,
        }
    }
}

impl TrainerConfig {
    /// Configuration with the given hyperparameters and default run options
    pub fn new(params: SvmParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Resolve the worker thread count
    pub fn worker_threads(&self) -> Result<usize> {
        match self.threads {
            Some(0) => Err(SVMError::InvalidParameter(
                "Worker thread count must be at least 1".to_string(),
            )),
            Some(n) => Ok(n),
            None => Ok(std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default() {
        let params = SvmParams::default();
        assert_eq!(params.cost(), 1.0);
        assert_eq!(params.eps(), 1e-4);
        assert!(params.is_linear());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_invalid_kernel_name() {
        let result = SvmParams::new(1.0, 1e-3, "cubic", 1.0, 0.0, 1.0);
        assert!(matches!(result, Err(SVMError::InvalidKernel(name)) if name == "cubic"));
    }

    #[test]
    fn test_params_invalid_values() {
        assert!(matches!(
            SvmParams::linear(0.0, 1e-3),
            Err(SVMError::InvalidParameter(_))
        ));
        assert!(matches!(
            SvmParams::linear(1.0, -1e-3),
            Err(SVMError::InvalidParameter(_))
        ));
        assert!(matches!(
            SvmParams::new(1.0, 1e-3, "rbf", 0.0, 0.0, 1.0),
            Err(SVMError::InvalidParameter(_))
        ));
        assert!(matches!(
            SvmParams::new(1.0, 1e-3, "poly", 1.0, 0.0, 0.0),
            Err(SVMError::InvalidParameter(_))
        ));
        assert!(matches!(
            SvmParams::new(1.0, 1e-3, "sigmoid", 1.0, f64::NAN, 1.0),
            Err(SVMError::InvalidParameter(_))
        ));
        // Unused kernel parameters are not range checked for linear
        assert!(SvmParams::new(1.0, 1e-3, "linear", 0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_spec_round_trip() {
        let params = SvmParams::from_spec("0.5 0.001 poly 2 1 3").expect("valid spec");
        assert_eq!(params.cost(), 0.5);
        assert_eq!(params.eps(), 0.001);
        assert_eq!(params.kernel_type(), KernelType::Poly);
        assert_eq!(params.gamma(), 2.0);
        assert_eq!(params.coef0(), 1.0);
        assert_eq!(params.degree(), 3.0);

        let reparsed = SvmParams::from_spec(&params.to_spec()).expect("valid spec");
        assert_eq!(reparsed, params);
    }

    #[test]
    fn test_spec_defaults_and_errors() {
        let params = SvmParams::from_spec("1 1e-4 rbf").expect("valid spec");
        assert_eq!(params.gamma(), 1.0);
        assert_eq!(params.coef0(), 0.0);
        assert_eq!(params.degree(), 1.0);

        assert!(matches!(
            SvmParams::from_spec("1 1e-4"),
            Err(SVMError::ParseError(_))
        ));
        assert!(matches!(
            SvmParams::from_spec("one 1e-4 linear"),
            Err(SVMError::ParseError(_))
        ));
        assert!(matches!(
            SvmParams::from_spec("1 1e-4 gaussian"),
            Err(SVMError::InvalidKernel(_))
        ));
    }

    #[test]
    fn test_header_display() {
        let params = SvmParams::new(2.0, 1e-3, "sigmoid", 0.5, -1.0, 1.0).expect("valid");
        let header = params.to_string();
        assert_eq!(
            header,
            "SVM_COST: 2\nSVM_EPS: 0.001\nKERNEL: sigmoid\nGAMMA: 0.5\nCOEF0: -1\nDEGREE: 1\n"
        );
    }

    #[test]
    fn test_make_kernel_and_back() {
        let params = SvmParams::new(1.0, 1e-3, "poly", 0.5, 1.0, 2.0).expect("valid");
        let kernel = params.make_kernel();
        assert_eq!(kernel.kernel_type(), KernelType::Poly);
        let captured = SvmParams::with_kernel(1.0, 1e-3, &kernel).expect("valid");
        assert_eq!(captured, params);
    }

    #[test]
    fn test_trainer_config_threads() {
        let mut config = TrainerConfig::default();
        assert!(config.worker_threads().expect("default threads") >= 1);

        config.threads = Some(3);
        assert_eq!(config.worker_threads().expect("explicit threads"), 3);

        config.threads = Some(0);
        assert!(matches!(
            config.worker_threads(),
            Err(SVMError::InvalidParameter(_))
        ));
    }
}
