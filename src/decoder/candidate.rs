use std::sync::Arc;

use crate::engine::{TokenId, Vocab};

/// Decomposed score of one candidate: values aligned positionally with a
/// feature-name schema shared by every candidate of a request.
///
/// Insertion order is the schema order; learners align vectors across
/// candidates by position or by name.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    names: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// `values` must be aligned with `names`.
    pub fn new(names: Arc<[String]>, values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Look up one component by feature name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Iterate `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Dot product with a weight slice aligned to the schema.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.values.iter().zip(weights).map(|(v, w)| v * w).sum()
    }

    /// Unweighted sum of all components.
    pub fn component_sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One scored translation hypothesis: target tokens, the per-feature score
/// decomposition, and the total score under the active weights.
///
/// Invariant: `total` equals `features.dot(weights)` for the engine's
/// weight configuration, within floating-point tolerance.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub tokens: Vec<TokenId>,
    pub features: FeatureVector,
    pub total: f64,
}

impl Candidate {
    /// Render the target tokens against the engine's vocabulary.
    pub fn surface(&self, vocab: &Vocab) -> String {
        self.tokens
            .iter()
            .map(|&t| vocab.token(t))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
