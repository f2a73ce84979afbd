//! Trained two-class classifier
//!
//! The classifier keeps only what prediction needs. For the linear kernel the
//! weighted support vectors are folded into a single weight vector when the
//! classifier is built, so scoring is one dot product. For the other kernels
//! the weighted support vectors are retained and scoring sums kernel values
//! against each of them.
//!
//! Scores are normalized by the length of the scored vector so that scores
//! from models over differently sized feature vectors remain comparable.

use crate::core::{
    BinaryClassifier, FeatureVector, Prediction, Result, SVMError, SvmParams,
};
use crate::kernel::{Kernel, KernelFunction, KernelType};
use rayon::prelude::*;
use serde::Serialize;

/// A retained support vector with its signed weight `alpha * y`
#[derive(Debug, Clone, PartialEq)]
pub struct SupportVector {
    pub weight: f64,
    pub vector: FeatureVector,
}

impl SupportVector {
    pub fn new(weight: f64, vector: FeatureVector) -> Self {
        Self { weight, vector }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DecisionModel {
    /// Collapsed `sum(weight * sv)`
    Linear { weights: FeatureVector },
    Kernel { support: Vec<SupportVector> },
}

/// Unbiased decision value `sum(weight * K(z, sv))` over explicit support vectors
pub fn weighted_kernel_sum<K: Kernel>(
    kernel: &K,
    support: &[SupportVector],
    z: &FeatureVector,
) -> f64 {
    support
        .iter()
        .map(|sv| sv.weight * kernel.compute(z, &sv.vector))
        .sum()
}

/// Trained SMO classifier
#[derive(Debug, Clone, PartialEq)]
pub struct SvmClassifier {
    params: SvmParams,
    kernel: KernelFunction,
    threshold: f64,
    num_pos: usize,
    num_neg: usize,
    num_svs: usize,
    dims: Option<usize>,
    model: DecisionModel,
}

impl SvmClassifier {
    /// Build a classifier from weighted support vectors.
    ///
    /// With a linear kernel the support vectors are collapsed into one weight
    /// vector of length `dims` and dropped.
    pub fn from_support_vectors(
        params: SvmParams,
        threshold: f64,
        num_pos: usize,
        num_neg: usize,
        dims: usize,
        support: Vec<SupportVector>,
    ) -> Self {
        let num_svs = support.len();
        let model = if params.is_linear() {
            let mut weights = FeatureVector::zeros(dims);
            for sv in &support {
                weights.scale_add(sv.weight, &sv.vector);
            }
            DecisionModel::Linear { weights }
        } else {
            DecisionModel::Kernel { support }
        };

        Self {
            kernel: params.make_kernel(),
            params,
            threshold,
            num_pos,
            num_neg,
            num_svs,
            dims: Some(dims),
            model,
        }
    }

    /// Reassemble a classifier from its persisted parts
    pub(crate) fn from_parts(
        params: SvmParams,
        threshold: f64,
        num_pos: usize,
        num_neg: usize,
        num_svs: usize,
        model: DecisionModel,
    ) -> Self {
        let dims = match &model {
            DecisionModel::Linear { weights } => Some(weights.len()),
            DecisionModel::Kernel { support } => support.first().map(|sv| sv.vector.len()),
        };
        Self {
            kernel: params.make_kernel(),
            params,
            threshold,
            num_pos,
            num_neg,
            num_svs,
            dims,
            model,
        }
    }

    pub(crate) fn model(&self) -> &DecisionModel {
        &self.model
    }

    /// Decision value `f(z) - b` before normalization.
    ///
    /// # Panics
    /// Panics if `z` does not have the length of the training vectors
    pub fn decision_value(&self, z: &FeatureVector) -> f64 {
        if let Some(dims) = self.dims {
            assert_eq!(
                z.len(),
                dims,
                "Feature vector length must match the training vectors"
            );
        }
        let f = match &self.model {
            DecisionModel::Linear { weights } => weights.dot(z),
            DecisionModel::Kernel { support } => weighted_kernel_sum(&self.kernel, support, z),
        };
        f - self.threshold
    }

    /// Normalized score: the decision value divided by the length of `z`.
    ///
    /// # Panics
    /// Panics if `z` is empty or its length differs from the training vectors
    pub fn predict(&self, z: &FeatureVector) -> f64 {
        assert!(!z.is_empty(), "Cannot score an empty feature vector");
        self.decision_value(z) / z.len() as f64
    }

    /// [`SvmClassifier::predict`] with the length checks reported as errors
    pub fn checked_predict(&self, z: &FeatureVector) -> Result<f64> {
        if z.is_empty() {
            return Err(SVMError::InvalidDataset(
                "Cannot score an empty feature vector".to_string(),
            ));
        }
        match self.dims {
            Some(expected) if expected != z.len() => Err(SVMError::DimensionMismatch {
                expected,
                actual: z.len(),
            }),
            _ => Ok(self.predict(z)),
        }
    }

    /// Score many vectors in parallel
    pub fn predict_batch(&self, samples: &[FeatureVector]) -> Vec<f64> {
        samples.par_iter().map(|z| self.predict(z)).collect()
    }

    /// Score and label a vector
    pub fn classify(&self, z: &FeatureVector) -> Prediction {
        Prediction::from_score(self.predict(z))
    }

    pub fn params(&self) -> &SvmParams {
        &self.params
    }

    pub fn kernel(&self) -> &KernelFunction {
        &self.kernel
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of positive training examples
    pub fn num_pos(&self) -> usize {
        self.num_pos
    }

    /// Number of negative training examples
    pub fn num_neg(&self) -> usize {
        self.num_neg
    }

    /// Number of support vectors found at training time, including those
    /// folded into the linear weight vector
    pub fn num_support_vectors(&self) -> usize {
        self.num_svs
    }

    /// Feature vector length, unknown only for a loaded non-linear model
    /// without support vectors
    pub fn dims(&self) -> Option<usize> {
        self.dims
    }

    pub fn is_linear(&self) -> bool {
        matches!(self.model, DecisionModel::Linear { .. })
    }

    /// Collapsed weight vector of a linear classifier
    pub fn linear_weights(&self) -> Option<&FeatureVector> {
        match &self.model {
            DecisionModel::Linear { weights } => Some(weights),
            DecisionModel::Kernel { .. } => None,
        }
    }

    /// Retained support vectors of a non-linear classifier
    pub fn support_vectors(&self) -> Option<&[SupportVector]> {
        match &self.model {
            DecisionModel::Linear { .. } => None,
            DecisionModel::Kernel { support } => Some(support),
        }
    }

    /// Get model summary
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            kernel: self.params.kernel_type(),
            cost: self.params.cost(),
            eps: self.params.eps(),
            gamma: self.params.gamma(),
            coef0: self.params.coef0(),
            degree: self.params.degree(),
            threshold: self.threshold,
            num_pos: self.num_pos,
            num_neg: self.num_neg,
            num_support_vectors: self.num_svs,
            dims: self.dims,
        }
    }
}

impl BinaryClassifier for SvmClassifier {
    fn predict(&self, sample: &FeatureVector) -> f64 {
        SvmClassifier::predict(self, sample)
    }

    fn predict_batch(&self, samples: &[FeatureVector]) -> Vec<f64> {
        SvmClassifier::predict_batch(self, samples)
    }

    fn n_support_vectors(&self) -> usize {
        self.num_svs
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Flat description of a trained model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub kernel: KernelType,
    pub cost: f64,
    pub eps: f64,
    pub gamma: f64,
    pub coef0: f64,
    pub degree: f64,
    pub threshold: f64,
    pub num_pos: usize,
    pub num_neg: usize,
    pub num_support_vectors: usize,
    pub dims: Option<usize>,
}
