//! The search engine: phrase trellis construction and N-best path
//! extraction. Decoders drive it through [`Manager`], one per request.

pub mod manager;
mod nbest;
pub mod score;
pub mod trellis;

pub use manager::{Hypothesis, Manager};
pub use score::{FeatureDelta, ModelScorer, ScoreFunction, FEATURE_NAMES, NUM_FEATURES};
pub use trellis::{build_trellis, PhraseNode, Trellis};
