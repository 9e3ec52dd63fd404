//! Engine bootstrap and process-wide model state.
//!
//! [`initialize`] runs exactly once per process; a second call fails with
//! [`ConfigError::AlreadyInitialized`]. The resulting [`EngineState`] is
//! immutable and shared read-only by every decoding request. For tests and
//! embedded setups an [`EngineState`] can also be constructed directly and
//! injected into a decoder without touching the global.

pub mod config;
pub mod lm;
pub mod phrase_table;
pub mod vocab;

pub use config::{ConfigError, EngineConfig, FeatureWeights};
pub use lm::BigramLm;
pub use phrase_table::{PhraseOption, PhraseTable};
pub use vocab::{TokenId, Vocab};

use std::io;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::info;

/// Error loading a model table (phrase table or language model).
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{file}:{line}: {msg}")]
    Parse {
        file: String,
        line: usize,
        msg: String,
    },
}

/// All model state needed to decode: vocabulary, phrase table, optional
/// language model, feature weights and N-best options.
///
/// Immutable after construction; safe to share across threads.
#[derive(Debug)]
pub struct EngineState {
    vocab: Vocab,
    table: PhraseTable,
    lm: Option<BigramLm>,
    weights: FeatureWeights,
    distinct_nbest: bool,
    schema: Arc<[String]>,
    pass_through: Vec<String>,
}

impl EngineState {
    pub fn new(
        vocab: Vocab,
        table: PhraseTable,
        lm: Option<BigramLm>,
        weights: FeatureWeights,
        distinct_nbest: bool,
    ) -> Self {
        let schema: Arc<[String]> = crate::search::FEATURE_NAMES
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self {
            vocab,
            table,
            lm,
            weights,
            distinct_nbest,
            schema,
            pass_through: Vec::new(),
        }
    }

    /// Load all model tables named by a configuration.
    pub fn build(config: &EngineConfig) -> Result<Self, ConfigError> {
        let mut vocab = Vocab::new();
        let table = PhraseTable::load(&config.phrase_table, &mut vocab)?;
        let lm = match &config.language_model {
            Some(path) => Some(BigramLm::load(path, &mut vocab)?),
            None => None,
        };
        info!(
            phrases = table.len(),
            vocab = vocab.len(),
            lm = lm.as_ref().map(BigramLm::len),
            "engine models loaded"
        );
        let mut state = Self::new(vocab, table, lm, config.weights, config.distinct_nbest);
        state.pass_through = config.pass_through.clone();
        Ok(state)
    }

    /// Shorthand for building an in-memory state from phrase-table triples.
    pub fn from_entries(
        phrases: &[(&str, &str, f64)],
        bigrams: &[(&str, &str, f64)],
        weights: FeatureWeights,
    ) -> Self {
        let mut vocab = Vocab::new();
        let table = PhraseTable::from_entries(phrases, &mut vocab);
        let lm = if bigrams.is_empty() {
            None
        } else {
            Some(BigramLm::from_entries(bigrams, &mut vocab))
        };
        Self::new(vocab, table, lm, weights, true)
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn table(&self) -> &PhraseTable {
        &self.table
    }

    pub fn lm(&self) -> Option<&BigramLm> {
        self.lm.as_ref()
    }

    pub fn weights(&self) -> FeatureWeights {
        self.weights
    }

    /// Feature names, in the order every [`crate::decoder::FeatureVector`]
    /// produced by this engine uses.
    pub fn schema(&self) -> &Arc<[String]> {
        &self.schema
    }

    /// Whether N-best extraction drops duplicate target sequences reached
    /// through distinct derivations.
    pub fn distinct_nbest(&self) -> bool {
        self.distinct_nbest
    }

    /// Arguments the configuration layer did not recognize.
    pub fn pass_through(&self) -> &[String] {
        &self.pass_through
    }
}

static GLOBAL: OnceLock<Arc<EngineState>> = OnceLock::new();

/// Build the process-wide engine state from a parsed configuration.
///
/// Must complete before any decoding request; calling it a second time
/// fails with [`ConfigError::AlreadyInitialized`]. Not safe to run
/// concurrently with itself; callers synchronize the one-time bootstrap.
pub fn initialize(config: &EngineConfig) -> Result<Arc<EngineState>, ConfigError> {
    crate::trace_init::init_tracing(config.verbosity);
    let state = Arc::new(EngineState::build(config)?);
    GLOBAL
        .set(Arc::clone(&state))
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    info!("engine initialized");
    Ok(state)
}

/// Bootstrap entry point: read a TOML configuration file, apply an optional
/// verbosity override and `key=value` arguments, then [`initialize`].
pub fn initialize_from_file(
    path: &Path,
    verbosity: Option<u8>,
    args: &[String],
) -> Result<Arc<EngineState>, ConfigError> {
    let mut config = EngineConfig::load(path)?;
    if let Some(v) = verbosity {
        config.verbosity = v;
    }
    config.apply_args(args)?;
    initialize(&config)
}

/// The process-wide engine state, if bootstrap has completed.
pub fn global() -> Option<Arc<EngineState>> {
    GLOBAL.get().map(Arc::clone)
}
