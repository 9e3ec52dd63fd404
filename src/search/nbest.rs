use std::collections::HashSet;

use crate::engine::TokenId;

use super::score::{add_delta, weighted, FeatureDelta, ScoreFunction, NUM_FEATURES};
use super::trellis::Trellis;

/// One extracted derivation path: trellis node indices in source order and
/// the accumulated weighted score.
#[derive(Debug, Clone)]
pub(crate) struct SearchPath {
    pub nodes: Vec<usize>,
    pub total: f64,
}

/// A single entry in the top-K list for a node: (accumulated weighted score,
/// previous node index, rank at that node). `prev_rank` identifies which of
/// the K paths at the previous node this entry continues from.
#[derive(Clone, Copy)]
struct KEntry {
    score: f64,
    prev_idx: Option<usize>,
    prev_rank: usize,
}

/// Run N-best extraction: keep top-K score/backpointer pairs per node.
///
/// Returns up to `n` `SearchPath`s in non-increasing weighted score; equal
/// scores keep the order the trellis reports paths in. When `distinct` is
/// set, derivations producing the same target token sequence collapse to
/// the highest-scoring one; the DP then over-generates so duplicate-target
/// derivations cannot crowd distinct translations out of the K-lists.
pub(crate) fn nbest_paths(
    trellis: &Trellis,
    score_fn: &dyn ScoreFunction,
    weights: &[f64; NUM_FEATURES],
    n: usize,
    distinct: bool,
) -> Vec<SearchPath> {
    let len = trellis.len;
    if len == 0 || n == 0 {
        return Vec::new();
    }

    let k = if distinct { n.saturating_mul(3) } else { n };
    let num_nodes = trellis.nodes.len();
    // top_k[node_idx] = sorted Vec of KEntry (descending score), max `k` entries
    let mut top_k: Vec<Vec<KEntry>> = vec![Vec::new(); num_nodes];

    // Initialize nodes starting at position 0 (BOS transition)
    for &idx in &trellis.nodes_by_start[0] {
        let node = &trellis.nodes[idx];
        let score =
            weighted(&score_fn.node_delta(node), weights) + weighted(&score_fn.bos_delta(node), weights);
        top_k[idx].push(KEntry {
            score,
            prev_idx: None,
            prev_rank: 0,
        });
    }

    // Forward pass — next_idx loop is outermost so node_delta is computed
    // once per next node instead of once per (prev, next) pair.
    for pos in 1..len {
        for &next_idx in &trellis.nodes_by_start[pos] {
            let next_node = &trellis.nodes[next_idx];
            let node_score = weighted(&score_fn.node_delta(next_node), weights);

            for &prev_idx in &trellis.nodes_by_end[pos] {
                if top_k[prev_idx].is_empty() {
                    continue;
                }
                let prev_node = &trellis.nodes[prev_idx];
                let transition =
                    weighted(&score_fn.transition_delta(prev_node, next_node), weights);

                for rank in 0..top_k[prev_idx].len() {
                    let total = top_k[prev_idx][rank].score + transition + node_score;
                    insert_top_k(
                        &mut top_k[next_idx],
                        k,
                        KEntry {
                            score: total,
                            prev_idx: Some(prev_idx),
                            prev_rank: rank,
                        },
                    );
                }
            }
        }
    }

    // Collect top-K at the goal position (EOS transition)
    let mut goal_entries: Vec<(f64, usize, usize)> = Vec::new(); // (total, node_idx, rank)
    for &node_idx in &trellis.nodes_by_end[len] {
        let node = &trellis.nodes[node_idx];
        let eos = weighted(&score_fn.eos_delta(node), weights);
        for (rank, entry) in top_k[node_idx].iter().enumerate() {
            goal_entries.push((entry.score + eos, node_idx, rank));
        }
    }
    // Stable sort: equal totals keep trellis emission order
    goal_entries.sort_by(|a, b| b.0.total_cmp(&a.0));

    // Backtrace each path, optionally deduplicating by target sequence
    let mut results: Vec<SearchPath> = Vec::new();
    let mut seen_targets: HashSet<Vec<TokenId>> = HashSet::new();

    for &(total, end_idx, end_rank) in &goal_entries {
        if results.len() >= n {
            break;
        }
        let nodes = backtrace(&top_k, end_idx, end_rank);
        if distinct {
            let key: Vec<TokenId> = nodes
                .iter()
                .flat_map(|&idx| trellis.nodes[idx].target.iter().copied())
                .collect();
            if !seen_targets.insert(key) {
                continue;
            }
        }
        results.push(SearchPath { nodes, total });
    }

    results
}

/// Sum the per-feature contributions along a path, replaying the same deltas
/// the forward pass weighted.
pub(crate) fn decompose_path(
    trellis: &Trellis,
    score_fn: &dyn ScoreFunction,
    path: &SearchPath,
) -> FeatureDelta {
    let mut features = [0.0; NUM_FEATURES];
    let mut prev: Option<usize> = None;
    for &idx in &path.nodes {
        let node = &trellis.nodes[idx];
        match prev {
            None => add_delta(&mut features, score_fn.bos_delta(node)),
            Some(p) => add_delta(
                &mut features,
                score_fn.transition_delta(&trellis.nodes[p], node),
            ),
        }
        add_delta(&mut features, score_fn.node_delta(node));
        prev = Some(idx);
    }
    if let Some(last) = prev {
        add_delta(&mut features, score_fn.eos_delta(&trellis.nodes[last]));
    }
    features
}

/// Insert a KEntry into a top-K list, maintaining descending sort by score
/// and max size `k`. Ties insert after existing equal entries.
fn insert_top_k(list: &mut Vec<KEntry>, k: usize, entry: KEntry) {
    let pos = list.partition_point(|e| e.score >= entry.score);
    if pos >= k {
        return; // worse than all K existing entries
    }
    list.insert(pos, entry);
    if list.len() > k {
        list.pop();
    }
}

/// Backtrace from a specific (node_idx, rank) to reconstruct a path.
fn backtrace(top_k: &[Vec<KEntry>], end_idx: usize, end_rank: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut cur_idx = end_idx;
    let mut cur_rank = end_rank;

    loop {
        path.push(cur_idx);
        let entry = &top_k[cur_idx][cur_rank];
        match entry.prev_idx {
            Some(prev) => {
                cur_rank = entry.prev_rank;
                cur_idx = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PhraseTable, Vocab};
    use crate::search::score::ModelScorer;
    use crate::search::trellis::build_trellis;

    fn paths_for(
        phrases: &[(&str, &str, f64)],
        source: &str,
        n: usize,
        distinct: bool,
    ) -> (Vec<SearchPath>, Trellis, Vocab) {
        let mut vocab = Vocab::new();
        let table = PhraseTable::from_entries(phrases, &mut vocab);
        let source: Vec<_> = source
            .split_whitespace()
            .map(|t| vocab.intern(t))
            .collect();
        let trellis = build_trellis(&table, &source);
        let scorer = ModelScorer::new(None);
        let paths = nbest_paths(&trellis, &scorer, &[1.0, 1.0, 0.0, 0.0], n, distinct);
        (paths, trellis, vocab)
    }

    fn surface(path: &SearchPath, trellis: &Trellis, vocab: &Vocab) -> String {
        path.nodes
            .iter()
            .flat_map(|&idx| trellis.nodes[idx].target.iter())
            .map(|&t| vocab.token(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    const TOY: &[(&str, &str, f64)] = &[
        ("a", "A", -0.2),
        ("a", "X", -1.0),
        ("b", "B", -0.3),
        ("a b", "AB", -0.4),
    ];

    #[test]
    fn test_sorted_non_increasing() {
        let (paths, _, _) = paths_for(TOY, "a b", 10, true);
        assert!(paths.len() >= 3);
        for pair in paths.windows(2) {
            assert!(pair[0].total >= pair[1].total);
        }
    }

    #[test]
    fn test_best_path_first() {
        // A B = -0.5, AB = -0.4, X B = -1.3
        let (paths, trellis, vocab) = paths_for(TOY, "a b", 10, true);
        assert_eq!(surface(&paths[0], &trellis, &vocab), "AB");
        assert_eq!(surface(&paths[1], &trellis, &vocab), "A B");
        assert_eq!(surface(&paths[2], &trellis, &vocab), "X B");
    }

    #[test]
    fn test_truncates_to_n() {
        let (paths, _, _) = paths_for(TOY, "a b", 2, true);
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_fewer_derivations_than_n() {
        let (paths, _, _) = paths_for(&[("a", "A", -0.2), ("b", "B", -0.3)], "a b", 5, true);
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_unreachable_goal_is_empty() {
        let (paths, _, _) = paths_for(&[("a", "A", -0.2)], "a b", 5, true);
        assert!(paths.is_empty());
    }

    #[test]
    fn test_distinct_collapses_equal_targets() {
        // Two derivations of "A B": one-phrase (-0.4) and two-phrase (-0.5)
        let phrases = &[
            ("a", "A", -0.2),
            ("b", "B", -0.3),
            ("a b", "A B", -0.4),
        ];
        let (paths, trellis, vocab) = paths_for(phrases, "a b", 10, true);
        assert_eq!(paths.len(), 1);
        assert_eq!(surface(&paths[0], &trellis, &vocab), "A B");
        assert!((paths[0].total - (-0.4)).abs() < 1e-9);

        let (all_paths, _, _) = paths_for(phrases, "a b", 10, false);
        assert_eq!(all_paths.len(), 2);
    }

    #[test]
    fn test_distinct_duplicates_do_not_crowd_out_translations() {
        // "a" has two options with the same target "A"; after dedup the
        // distinct "X B" translation must still be reachable for n = 2
        let phrases = &[
            ("a", "A", -0.2),
            ("a", "A", -0.4),
            ("a", "X", -1.0),
            ("b", "B", -0.3),
        ];
        let (paths, trellis, vocab) = paths_for(phrases, "a b", 2, true);
        assert_eq!(paths.len(), 2);
        assert_eq!(surface(&paths[0], &trellis, &vocab), "A B");
        assert_eq!(surface(&paths[1], &trellis, &vocab), "X B");
    }

    #[test]
    fn test_decompose_matches_total() {
        let (paths, trellis, _) = paths_for(TOY, "a b", 10, true);
        let scorer = ModelScorer::new(None);
        let weights = [1.0, 1.0, 0.0, 0.0];
        for path in &paths {
            let features = decompose_path(&trellis, &scorer, path);
            assert!((weighted(&features, &weights) - path.total).abs() < 1e-9);
        }
    }

    #[test]
    fn test_tie_order_stable() {
        // Equal totals must come back in the same order every run
        let phrases = &[("a", "A", -0.5), ("a", "B", -0.5)];
        let (first, trellis, vocab) = paths_for(phrases, "a", 5, true);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].total, first[1].total);
        let order: Vec<String> = first
            .iter()
            .map(|p| surface(p, &trellis, &vocab))
            .collect();
        for _ in 0..5 {
            let (again, trellis, vocab) = paths_for(phrases, "a", 5, true);
            let order_again: Vec<String> = again
                .iter()
                .map(|p| surface(p, &trellis, &vocab))
                .collect();
            assert_eq!(order, order_again);
        }
    }
}
