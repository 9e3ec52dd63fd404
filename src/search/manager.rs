use tracing::debug;

use crate::engine::{EngineState, TokenId};

use super::nbest::{decompose_path, nbest_paths};
use super::score::{FeatureDelta, ModelScorer};
use super::trellis::{build_trellis, Trellis};

/// A complete derivation extracted from the trellis: target tokens, the
/// per-feature score decomposition, and the weighted total the search
/// ranked it by.
#[derive(Debug, Clone)]
pub struct Hypothesis {
    pub target: Vec<TokenId>,
    pub features: FeatureDelta,
    pub total: f64,
}

/// Per-request search structure: owns the trellis built for one source
/// sentence and extracts ranked hypotheses from it.
///
/// One manager per request; it is never shared and drops with the request,
/// on success and on error paths alike.
pub struct Manager<'a> {
    state: &'a EngineState,
    trellis: Trellis,
}

impl<'a> Manager<'a> {
    pub fn new(state: &'a EngineState, source: &[TokenId]) -> Self {
        let trellis = build_trellis(state.table(), source);
        debug!(
            source_len = source.len(),
            nodes = trellis.nodes.len(),
            "trellis built"
        );
        Self { state, trellis }
    }

    /// Extract up to `count` hypotheses in non-increasing total score.
    ///
    /// Empty when no derivation covers the sentence.
    pub fn n_best(&self, count: usize) -> Vec<Hypothesis> {
        let scorer = ModelScorer::new(self.state.lm());
        let weights = self.state.weights().to_array();
        let paths = nbest_paths(
            &self.trellis,
            &scorer,
            &weights,
            count,
            self.state.distinct_nbest(),
        );
        debug!(requested = count, extracted = paths.len(), "n-best paths");

        paths
            .into_iter()
            .map(|path| {
                let features = decompose_path(&self.trellis, &scorer, &path);
                let target = path
                    .nodes
                    .iter()
                    .flat_map(|&idx| self.trellis.nodes[idx].target.iter().copied())
                    .collect();
                Hypothesis {
                    target,
                    features,
                    total: path.total,
                }
            })
            .collect()
    }
}
