use crate::engine::BigramLm;

use super::trellis::PhraseNode;

/// Number of features in the engine's score decomposition.
pub const NUM_FEATURES: usize = 4;

/// Feature names, in schema order. Every feature vector the engine produces
/// is aligned to this order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = ["tm", "lm", "word_penalty", "phrase_penalty"];

pub const TM: usize = 0;
pub const LM: usize = 1;
pub const WORD_PENALTY: usize = 2;
pub const PHRASE_PENALTY: usize = 3;

/// Per-feature score contribution of one derivation step, aligned with
/// [`FEATURE_NAMES`]. Log-domain: higher is better.
pub type FeatureDelta = [f64; NUM_FEATURES];

pub fn add_delta(acc: &mut FeatureDelta, delta: FeatureDelta) {
    for (a, d) in acc.iter_mut().zip(delta) {
        *a += d;
    }
}

pub fn weighted(delta: &FeatureDelta, weights: &[f64; NUM_FEATURES]) -> f64 {
    delta.iter().zip(weights).map(|(d, w)| d * w).sum()
}

/// Trait for scoring trellis paths during N-best search.
///
/// Each method returns the per-feature contribution of one step; the search
/// ranks paths by the weighted sum and the decomposition is recovered by
/// replaying these deltas along the extracted path.
pub trait ScoreFunction: Send + Sync {
    fn node_delta(&self, node: &PhraseNode) -> FeatureDelta;
    fn transition_delta(&self, prev: &PhraseNode, next: &PhraseNode) -> FeatureDelta;
    fn bos_delta(&self, node: &PhraseNode) -> FeatureDelta;
    fn eos_delta(&self, node: &PhraseNode) -> FeatureDelta;
}

/// Default scorer: phrase-table score, bigram language model, word and
/// phrase penalties. Without a language model the lm component is 0 for
/// every step, keeping the schema identical across configurations.
pub struct ModelScorer<'a> {
    lm: Option<&'a BigramLm>,
}

impl<'a> ModelScorer<'a> {
    pub fn new(lm: Option<&'a BigramLm>) -> Self {
        Self { lm }
    }

    fn lm_internal(&self, node: &PhraseNode) -> f64 {
        let Some(lm) = self.lm else { return 0.0 };
        node.target
            .windows(2)
            .map(|pair| lm.score(pair[0], pair[1]))
            .sum()
    }
}

impl ScoreFunction for ModelScorer<'_> {
    fn node_delta(&self, node: &PhraseNode) -> FeatureDelta {
        let mut delta = [0.0; NUM_FEATURES];
        delta[TM] = node.tm;
        delta[LM] = self.lm_internal(node);
        delta[WORD_PENALTY] = -(node.target.len() as f64);
        delta[PHRASE_PENALTY] = -1.0;
        delta
    }

    fn transition_delta(&self, prev: &PhraseNode, next: &PhraseNode) -> FeatureDelta {
        let mut delta = [0.0; NUM_FEATURES];
        if let (Some(lm), Some(&left), Some(&right)) =
            (self.lm, prev.target.last(), next.target.first())
        {
            delta[LM] = lm.score(left, right);
        }
        delta
    }

    fn bos_delta(&self, node: &PhraseNode) -> FeatureDelta {
        let mut delta = [0.0; NUM_FEATURES];
        if let (Some(lm), Some(&first)) = (self.lm, node.target.first()) {
            delta[LM] = lm.score(lm.bos(), first);
        }
        delta
    }

    fn eos_delta(&self, node: &PhraseNode) -> FeatureDelta {
        let mut delta = [0.0; NUM_FEATURES];
        if let (Some(lm), Some(&last)) = (self.lm, node.target.last()) {
            delta[LM] = lm.score(last, lm.eos());
        }
        delta
    }
}
