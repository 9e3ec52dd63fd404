//! N-best decoder boundary for margin-based MT training.
//!
//! A training loop bootstraps the engine once ([`engine::initialize`] or
//! [`engine::initialize_from_file`]), then repeatedly asks a [`Decoder`] for
//! the top-K translation candidates of a source sentence. Each
//! [`Candidate`] carries its target tokens and a decomposed per-feature
//! score vector, so the learner can compute per-feature gradients against
//! reference translations.
//!
//! ```no_run
//! use mt_engine::{Decoder, EngineDecoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! mt_engine::engine::initialize_from_file("engine.toml".as_ref(), None, &[])?;
//! let decoder = EngineDecoder::from_global()?;
//! for candidate in decoder.n_best("das ist ein haus", 10)? {
//!     println!("{} {:?}", candidate.total, candidate.features.values());
//! }
//! # Ok(())
//! # }
//! ```

pub mod decoder;
pub mod engine;
pub mod search;
pub mod trace_init;

#[cfg(test)]
pub(crate) mod testutil;

pub use decoder::{Candidate, DecodeError, Decoder, EngineDecoder, FeatureVector, MockDecoder};
pub use engine::{ConfigError, EngineConfig, EngineState, FeatureWeights, ModelError, TokenId};
