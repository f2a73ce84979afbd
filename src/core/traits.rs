//! Core traits for trained classifiers

use crate::core::{FeatureVector, Prediction};

/// A trained two-class classifier
pub trait BinaryClassifier: Send + Sync {
    /// Score a feature vector; the sign is the predicted class
    fn predict(&self, sample: &FeatureVector) -> f64;

    /// Score a feature vector and attach the predicted label
    fn classify(&self, sample: &FeatureVector) -> Prediction {
        Prediction::from_score(self.predict(sample))
    }

    /// Score multiple feature vectors
    fn predict_batch(&self, samples: &[FeatureVector]) -> Vec<f64> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    /// Get the number of support vectors retained at training time
    fn n_support_vectors(&self) -> usize;

    /// Get the decision threshold
    fn threshold(&self) -> f64;
}
