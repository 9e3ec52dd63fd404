#![cfg(test)]

use crate::engine::{EngineState, FeatureWeights};

/// Shared toy model for decoder tests.
///
/// Source side covers "a", "b", "c" and the two-token phrase "a b";
/// word and phrase penalties are weighted to zero so expected totals stay
/// easy to read:
///
/// - "a b" has three distinct derivations: AB (-0.4), A B (-0.5), X B (-1.3)
/// - "c" has exactly two: C (-0.5), K (-0.8)
pub fn toy_state() -> EngineState {
    EngineState::from_entries(
        &[
            ("a", "A", -0.2),
            ("a", "X", -1.0),
            ("b", "B", -0.3),
            ("a b", "AB", -0.4),
            ("c", "C", -0.5),
            ("c", "K", -0.8),
        ],
        &[],
        FeatureWeights {
            tm: 1.0,
            lm: 1.0,
            word_penalty: 0.0,
            phrase_penalty: 0.0,
        },
    )
}

/// Same phrase table with a bigram language model over the target side.
pub fn toy_state_with_lm() -> EngineState {
    EngineState::from_entries(
        &[
            ("a", "A", -0.2),
            ("a", "X", -1.0),
            ("b", "B", -0.3),
            ("a b", "AB", -0.4),
            ("c", "C", -0.5),
            ("c", "K", -0.8),
        ],
        &[
            ("<s>", "A", -0.1),
            ("A", "B", -0.2),
            ("B", "</s>", -0.1),
            ("<s>", "AB", -0.7),
            ("AB", "</s>", -0.1),
        ],
        FeatureWeights {
            tm: 1.0,
            lm: 1.0,
            word_penalty: 0.0,
            phrase_penalty: 0.0,
        },
    )
}
