//! Two-class Support Vector Machine training with Sequential Minimal Optimization
//!
//! Based on "Improvements to Platt's SMO Algorithm for SVM Classifier Design"
//! by Keerthi, Shevade, Bhattacharyya and Murthy. Kernel values are memoized
//! per training run and the per-iteration decision value update runs on a
//! worker pool.

pub mod api;
pub mod cache;
pub mod classifier;
pub mod core;
pub mod data;
pub mod kernel;
pub mod persistence;
pub mod solver;

// Re-export main types for convenience
pub use crate::api::{train, Svm};
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::classifier::{weighted_kernel_sum, ModelSummary, SupportVector, SvmClassifier};
pub use crate::core::error::{Result, SVMError};
pub use crate::core::params::*;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::kernel::{Kernel, KernelFunction, KernelType};
pub use crate::solver::{SmoTrainer, TrainingOutcome, TAU};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
