use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::vocab::{TokenId, Vocab};
use super::ModelError;

/// Sentence-boundary markers used in language-model files.
pub const BOS_MARKER: &str = "<s>";
pub const EOS_MARKER: &str = "</s>";

/// Bigram language model over target tokens.
///
/// Text format, one bigram per line: `left right logprob`, where `left` and
/// `right` may be the boundary markers `<s>` and `</s>`. Unseen bigrams
/// contribute 0.0 so the lm feature stays a pure sum of observed evidence.
#[derive(Debug)]
pub struct BigramLm {
    scores: HashMap<(TokenId, TokenId), f64>,
    bos: TokenId,
    eos: TokenId,
}

impl BigramLm {
    pub fn load(path: &Path, vocab: &mut Vocab) -> Result<Self, ModelError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, &path.display().to_string(), vocab)
    }

    pub fn parse(text: &str, file: &str, vocab: &mut Vocab) -> Result<Self, ModelError> {
        let mut scores = HashMap::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parse_err = |msg: &str| ModelError::Parse {
                file: file.to_string(),
                line: idx + 1,
                msg: msg.to_string(),
            };
            let mut fields = line.split_whitespace();
            let (left, right, score) = match (fields.next(), fields.next(), fields.next()) {
                (Some(l), Some(r), Some(s)) => (l, r, s),
                _ => return Err(parse_err("expected `left right logprob`")),
            };
            if fields.next().is_some() {
                return Err(parse_err("trailing fields after logprob"));
            }
            let score: f64 = score
                .parse()
                .map_err(|_| parse_err("logprob is not a number"))?;
            scores.insert((vocab.intern(left), vocab.intern(right)), score);
        }
        Ok(Self {
            scores,
            bos: vocab.intern(BOS_MARKER),
            eos: vocab.intern(EOS_MARKER),
        })
    }

    /// Build from `(left, right, logprob)` triples. Used by tests.
    pub fn from_entries(entries: &[(&str, &str, f64)], vocab: &mut Vocab) -> Self {
        let scores = entries
            .iter()
            .map(|(l, r, s)| ((vocab.intern(l), vocab.intern(r)), *s))
            .collect();
        Self {
            scores,
            bos: vocab.intern(BOS_MARKER),
            eos: vocab.intern(EOS_MARKER),
        }
    }

    /// Log probability of the bigram `(left, right)`; 0.0 if unseen.
    pub fn score(&self, left: TokenId, right: TokenId) -> f64 {
        self.scores.get(&(left, right)).copied().unwrap_or(0.0)
    }

    pub fn bos(&self) -> TokenId {
        self.bos
    }

    pub fn eos(&self) -> TokenId {
        self.eos
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
