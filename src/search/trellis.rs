use crate::engine::{PhraseTable, TokenId};

/// A node in the search trellis: one phrase option applied over a source
/// span.
#[derive(Debug, Clone)]
pub struct PhraseNode {
    /// Start position (source token index, inclusive)
    pub start: usize,
    /// End position (source token index, exclusive)
    pub end: usize,
    /// Covered source tokens
    pub source: Vec<TokenId>,
    /// Target token sequence (never empty)
    pub target: Vec<TokenId>,
    /// Translation-model log probability of this phrase pair
    pub tm: f64,
}

/// The trellis: all phrase applications over one source sentence, with
/// monotone left-to-right combination.
pub struct Trellis {
    /// The source token sequence
    pub source: Vec<TokenId>,
    /// All nodes in the trellis
    pub nodes: Vec<PhraseNode>,
    /// nodes_by_end[i] = indices of nodes that end at position i
    pub nodes_by_end: Vec<Vec<usize>>,
    /// nodes_by_start[i] = indices of nodes that start at position i
    pub nodes_by_start: Vec<Vec<usize>>,
    /// Number of source tokens
    pub len: usize,
}

/// Build a trellis by enumerating every span the phrase table covers.
///
/// There is no unknown-word fallback: a position no phrase spans leaves the
/// goal unreachable, and N-best extraction over such a trellis yields an
/// empty list.
pub fn build_trellis(table: &PhraseTable, source: &[TokenId]) -> Trellis {
    let len = source.len();
    let mut nodes = Vec::new();
    // nodes_by_end has len + 1 slots (position 0 through len)
    let mut nodes_by_end: Vec<Vec<usize>> = vec![Vec::new(); len + 1];
    let mut nodes_by_start: Vec<Vec<usize>> = vec![Vec::new(); len];

    let max_span = table.max_source_len();
    for start in 0..len {
        for span in 1..=max_span.min(len - start) {
            let end = start + span;
            let Some(options) = table.lookup(&source[start..end]) else {
                continue;
            };
            for option in options {
                let idx = nodes.len();
                nodes.push(PhraseNode {
                    start,
                    end,
                    source: source[start..end].to_vec(),
                    target: option.target.clone(),
                    tm: option.tm,
                });
                nodes_by_end[end].push(idx);
                nodes_by_start[start].push(idx);
            }
        }
    }

    Trellis {
        source: source.to_vec(),
        nodes,
        nodes_by_end,
        nodes_by_start,
        len,
    }
}
