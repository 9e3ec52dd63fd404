use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::vocab::{TokenId, Vocab};
use super::ModelError;

/// One translation option for a source phrase: the target token sequence and
/// its translation-model log probability.
#[derive(Debug, Clone)]
pub struct PhraseOption {
    pub target: Vec<TokenId>,
    pub tm: f64,
}

/// Phrase translation table keyed by source token sequence.
///
/// Text format, one entry per line:
///
/// ```text
/// source tokens ||| target tokens ||| logprob
/// ```
///
/// Blank lines are skipped. Options for the same source phrase keep file
/// order, which fixes the engine-reported order for equal-scoring paths.
#[derive(Debug)]
pub struct PhraseTable {
    entries: HashMap<Vec<TokenId>, Vec<PhraseOption>>,
    max_source_len: usize,
}

impl PhraseTable {
    /// Load a phrase table from a file, interning all tokens into `vocab`.
    pub fn load(path: &Path, vocab: &mut Vocab) -> Result<Self, ModelError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, &path.display().to_string(), vocab)
    }

    /// Parse phrase-table text. `file` is used in error messages only.
    pub fn parse(text: &str, file: &str, vocab: &mut Vocab) -> Result<Self, ModelError> {
        let mut entries: HashMap<Vec<TokenId>, Vec<PhraseOption>> = HashMap::new();
        let mut max_source_len = 0;

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parse_err = |msg: &str| ModelError::Parse {
                file: file.to_string(),
                line: idx + 1,
                msg: msg.to_string(),
            };

            let fields: Vec<&str> = line.split("|||").map(str::trim).collect();
            if fields.len() != 3 {
                return Err(parse_err("expected `source ||| target ||| score`"));
            }

            let source: Vec<TokenId> = fields[0]
                .split_whitespace()
                .map(|t| vocab.intern(t))
                .collect();
            if source.is_empty() {
                return Err(parse_err("empty source phrase"));
            }
            let target: Vec<TokenId> = fields[1]
                .split_whitespace()
                .map(|t| vocab.intern(t))
                .collect();
            if target.is_empty() {
                return Err(parse_err("empty target phrase"));
            }
            let tm: f64 = fields[2]
                .parse()
                .map_err(|_| parse_err("score is not a number"))?;

            max_source_len = max_source_len.max(source.len());
            entries
                .entry(source)
                .or_default()
                .push(PhraseOption { target, tm });
        }

        Ok(Self {
            entries,
            max_source_len,
        })
    }

    /// Build a table from `(source, target, logprob)` triples, interning
    /// tokens into `vocab`. Used by in-memory engines and tests.
    pub fn from_entries(entries: &[(&str, &str, f64)], vocab: &mut Vocab) -> Self {
        let mut table: HashMap<Vec<TokenId>, Vec<PhraseOption>> = HashMap::new();
        let mut max_source_len = 0;
        for (source, target, tm) in entries {
            let source: Vec<TokenId> =
                source.split_whitespace().map(|t| vocab.intern(t)).collect();
            let target: Vec<TokenId> =
                target.split_whitespace().map(|t| vocab.intern(t)).collect();
            max_source_len = max_source_len.max(source.len());
            table.entry(source).or_default().push(PhraseOption {
                target,
                tm: *tm,
            });
        }
        Self {
            entries: table,
            max_source_len,
        }
    }

    /// All translation options for an exact source token sequence.
    pub fn lookup(&self, source: &[TokenId]) -> Option<&[PhraseOption]> {
        self.entries.get(source).map(Vec::as_slice)
    }

    /// Length of the longest source phrase, bounding span enumeration.
    pub fn max_source_len(&self) -> usize {
        self.max_source_len
    }

    /// Number of distinct source phrases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
