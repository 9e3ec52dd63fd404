use std::sync::Arc;

use tracing::debug;

use crate::engine::{EngineState, TokenId};
use crate::search::Manager;

use super::candidate::{Candidate, FeatureVector};
use super::{validate_request, DecodeError, Decoder};

/// Tolerance for the total-vs-decomposition consistency check.
const SCORE_EPSILON: f64 = 1e-6;

/// Engine-backed decoder: drives the search engine for one sentence and
/// converts the extracted derivations into [`Candidate`]s.
pub struct EngineDecoder {
    state: Arc<EngineState>,
}

impl EngineDecoder {
    /// Decoder over an explicitly constructed engine state.
    pub fn new(state: Arc<EngineState>) -> Self {
        Self { state }
    }

    /// Decoder over the process-wide engine state; fails with
    /// [`DecodeError::Unavailable`] before bootstrap completes.
    pub fn from_global() -> Result<Self, DecodeError> {
        let state = crate::engine::global().ok_or(DecodeError::Unavailable)?;
        Ok(Self::new(state))
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Map source tokens to vocabulary ids. `None` when any token is unknown
    /// to the models; the engine cannot segment such input and the request
    /// yields an empty list.
    fn source_ids(&self, source: &str) -> Option<Vec<TokenId>> {
        source
            .split_whitespace()
            .map(|t| self.state.vocab().get(t))
            .collect()
    }
}

impl Decoder for EngineDecoder {
    fn n_best(&self, source: &str, count: usize) -> Result<Vec<Candidate>, DecodeError> {
        validate_request(source, count)?;

        let Some(source_ids) = self.source_ids(source) else {
            debug!(source, "out-of-vocabulary source token, empty n-best");
            return Ok(Vec::new());
        };

        // The manager is the per-request search structure; it drops on every
        // exit path below, including the error return.
        let manager = Manager::new(&self.state, &source_ids);
        let hypotheses = manager.n_best(count);

        let weights = self.state.weights().to_array();
        let schema = Arc::clone(self.state.schema());
        let mut candidates = Vec::with_capacity(hypotheses.len());
        for hyp in hypotheses {
            let features = FeatureVector::new(Arc::clone(&schema), hyp.features.to_vec());
            let recombined = features.dot(&weights);
            if (recombined - hyp.total).abs() > SCORE_EPSILON {
                return Err(DecodeError::Failed {
                    msg: format!(
                        "score decomposition inconsistent: total {} vs components {}",
                        hyp.total, recombined
                    ),
                });
            }
            candidates.push(Candidate {
                tokens: hyp.target,
                features,
                total: hyp.total,
            });
        }
        debug!(source, count, returned = candidates.len(), "n-best done");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{toy_state, toy_state_with_lm};

    fn decoder() -> EngineDecoder {
        EngineDecoder::new(Arc::new(toy_state()))
    }

    #[test]
    fn test_nbest_sorted_and_bounded() {
        let dec = decoder();
        let result = dec.n_best("a b", 3).unwrap();

        assert!(!result.is_empty());
        assert!(result.len() <= 3);
        for pair in result.windows(2) {
            assert!(pair[0].total >= pair[1].total);
        }
    }

    #[test]
    fn test_total_equals_weighted_components() {
        let dec = decoder();
        let weights = dec.state().weights().to_array();
        for candidate in dec.n_best("a b", 10).unwrap() {
            assert!((candidate.features.dot(&weights) - candidate.total).abs() < 1e-6);
        }
    }

    #[test]
    fn test_identical_schema_across_candidates() {
        let dec = decoder();
        let result = dec.n_best("a b", 10).unwrap();
        assert!(result.len() >= 2);
        let names = result[0].features.names().to_vec();
        for candidate in &result {
            assert_eq!(candidate.features.names(), names.as_slice());
        }
    }

    #[test]
    fn test_idempotent_requests() {
        let dec = decoder();
        let first = dec.n_best("a b", 5).unwrap();
        let second = dec.n_best("a b", 5).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.tokens, b.tokens);
            assert_eq!(a.total, b.total);
            assert_eq!(a.features.values(), b.features.values());
        }
    }

    #[test]
    fn test_count_one_returns_single_best() {
        let dec = decoder();
        let all = dec.n_best("a b", 10).unwrap();
        let one = dec.n_best("a b", 1).unwrap();

        assert_eq!(one.len(), 1);
        assert_eq!(one[0].tokens, all[0].tokens);
        assert_eq!(one[0].total, all[0].total);
    }

    #[test]
    fn test_fewer_derivations_than_count() {
        // Only "c" -> "C" and "c" -> "K" cover this sentence: 2 derivations
        let dec = decoder();
        let result = dec.n_best("c", 5).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_duplicate_target_options_do_not_shrink_nbest() {
        use crate::engine::{EngineState, FeatureWeights};

        // Two phrase options translate "a" to the same "A"; with dedup on,
        // the list must still fill up from the remaining distinct targets
        let state = EngineState::from_entries(
            &[
                ("a", "A", -0.2),
                ("a", "A", -0.4),
                ("a", "X", -1.0),
                ("b", "B", -0.3),
            ],
            &[],
            FeatureWeights {
                tm: 1.0,
                lm: 1.0,
                word_penalty: 0.0,
                phrase_penalty: 0.0,
            },
        );
        let dec = EngineDecoder::new(Arc::new(state));
        let result = dec.n_best("a b", 2).unwrap();

        assert_eq!(result.len(), 2);
        let vocab = dec.state().vocab();
        assert_eq!(result[0].surface(vocab), "A B");
        assert_eq!(result[1].surface(vocab), "X B");
    }

    #[test]
    fn test_oov_yields_empty_list() {
        let dec = decoder();
        let result = dec.n_best("a qqq", 5).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_invalid_input() {
        let dec = decoder();
        assert!(matches!(
            dec.n_best("", 5),
            Err(DecodeError::InvalidInput { .. })
        ));
        assert!(matches!(
            dec.n_best("a b", 0),
            Err(DecodeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_lm_contributes_to_ranking() {
        let dec = EngineDecoder::new(Arc::new(toy_state_with_lm()));
        let result = dec.n_best("a b", 10).unwrap();
        assert!(!result.is_empty());

        // Every candidate still satisfies the decomposition invariant with
        // a non-zero lm component in play
        let weights = dec.state().weights().to_array();
        let mut saw_lm = false;
        for candidate in &result {
            assert!((candidate.features.dot(&weights) - candidate.total).abs() < 1e-6);
            if candidate.features.get("lm").unwrap() != 0.0 {
                saw_lm = true;
            }
        }
        assert!(saw_lm, "lm feature should be non-zero for some candidate");
    }

    #[test]
    fn test_surface_rendering() {
        let dec = decoder();
        let result = dec.n_best("a b", 1).unwrap();
        let surface = result[0].surface(dec.state().vocab());
        assert!(!surface.is_empty());
        assert!(surface.is_ascii());
    }
}
