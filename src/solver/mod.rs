//! SVM solver implementations
//!
//! This module implements Sequential Minimal Optimization (SMO) with the
//! working set selection of Keerthi et al., "Improvements to Platt's SMO
//! Algorithm for SVM Classifier Design" (2001).

pub mod smo;

pub use self::smo::*;
