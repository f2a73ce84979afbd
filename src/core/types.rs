//! Core type definitions for SMO training

use serde::{Deserialize, Serialize};

/// Prediction result containing label and score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Normalized decision score
    pub score: f64,
}

impl Prediction {
    /// Create a prediction from a score, labelling non-negative scores as positive
    pub fn from_score(score: f64) -> Self {
        let label = if score >= 0.0 { 1.0 } else { -1.0 };
        Self { label, score }
    }

    /// Whether the positive class was predicted
    pub fn is_positive(&self) -> bool {
        self.label > 0.0
    }
}

/// Dense feature vector of fixed length
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Create a feature vector from its values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Create a zero vector of the given dimensionality
    pub fn zeros(dim: usize) -> Self {
        Self {
            values: vec![0.0; dim],
        }
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the vector has no components
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the components
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Inner product with another vector of the same length
    pub fn dot(&self, other: &FeatureVector) -> f64 {
        debug_assert_eq!(self.len(), other.len(), "Vector lengths must match");
        self.values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Squared Euclidean distance to another vector of the same length
    pub fn squared_distance(&self, other: &FeatureVector) -> f64 {
        debug_assert_eq!(self.len(), other.len(), "Vector lengths must match");
        self.values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// In-place `self += weight * other`
    pub fn scale_add(&mut self, weight: f64, other: &FeatureVector) {
        debug_assert_eq!(self.len(), other.len(), "Vector lengths must match");
        for (a, b) in self.values.iter_mut().zip(&other.values) {
            *a += weight * b;
        }
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<&[f64]> for FeatureVector {
    fn from(values: &[f64]) -> Self {
        Self::new(values.to_vec())
    }
}

impl FromIterator<f64> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Working set selection heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkingSetStrategy {
    /// Extremal decision values over the high and low sets (Keerthi et al. 2001)
    #[default]
    FirstOrder,
    /// Partner of the high index chosen by maximal objective gain (Fan et al. 2005)
    SecondOrder,
}
