//! The decoder boundary: the [`Decoder`] trait a training loop consumes,
//! the [`Candidate`] data model, and the engine-backed adapter.

mod candidate;
mod engine;
mod mock;

pub use candidate::{Candidate, FeatureVector};
pub use engine::EngineDecoder;
pub use mock::MockDecoder;

/// Per-request decoding failure. None of these corrupt engine state or
/// affect other requests, and none are retried at this layer.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A request arrived before the engine was bootstrapped.
    #[error("decoding unavailable: engine not initialized")]
    Unavailable,

    /// The source sentence cannot be represented in the engine's input form.
    #[error("invalid input: {msg}")]
    InvalidInput { msg: String },

    /// The engine raised an internal fault while searching.
    #[error("decoding failed: {msg}")]
    Failed { msg: String },
}

/// Produce up to `count` ranked translation candidates for one source
/// sentence.
///
/// Guarantees: at most `count` candidates, ordered by non-increasing total
/// score, ties keeping engine order; fewer only when the search space is
/// genuinely smaller; an empty list (not an error) when no derivation
/// exists. Implementations do not mutate shared engine state.
pub trait Decoder: Send + Sync {
    fn n_best(&self, source: &str, count: usize) -> Result<Vec<Candidate>, DecodeError>;
}

/// Shared input validation for all decoder implementations.
pub(crate) fn validate_request(source: &str, count: usize) -> Result<(), DecodeError> {
    if count == 0 {
        return Err(DecodeError::InvalidInput {
            msg: "count must be at least 1".to_string(),
        });
    }
    if source.split_whitespace().next().is_none() {
        return Err(DecodeError::InvalidInput {
            msg: "source sentence is empty".to_string(),
        });
    }
    if source.chars().any(|c| c.is_control() && !c.is_whitespace()) {
        return Err(DecodeError::InvalidInput {
            msg: "source sentence contains control characters".to_string(),
        });
    }
    Ok(())
}
