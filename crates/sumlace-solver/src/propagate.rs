//! Pre-search pruning of the solution tries.

use std::collections::HashMap;

use log::{debug, trace};
use sumlace_core::ValuePool;

use crate::vector_state::VectorState;

/// Runs the singles and intersections passes until the total leaf count
/// across all eager tries stops decreasing.
///
/// Propagation only prunes; skipping it entirely leaves the search correct,
/// just slower. Lazy vectors have no materialized trie and are left alone —
/// their orderings are regenerated against the reduced state during search.
pub(crate) fn propagate(states: &mut [VectorState], pool: &ValuePool) {
    loop {
        let before = total_solutions(states);
        reduce_by_singles(states, pool);
        reduce_by_intersections(states);
        let after = total_solutions(states);
        debug!("propagation pass reduced {before} orderings to {after}");
        if after == before {
            break;
        }
    }
}

/// Total leaf count across all eager tries.
pub(crate) fn total_solutions(states: &[VectorState]) -> u64 {
    states
        .iter()
        .filter_map(|s| s.trie().map(crate::trie::SolutionTrie::solution_count))
        .sum()
}

/// A pool value with exactly one occurrence can be placed by at most one
/// vector. When some vectors need it in every ordering, every other vector
/// loses it at the positions not shared with a claimant that still allows it
/// there.
fn reduce_by_singles(states: &mut [VectorState], pool: &ValuePool) {
    for single in pool.singles() {
        let claimants: Vec<usize> = states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.trie().is_some_and(|t| t.all_solutions_use(single)))
            .map(|(i, _)| i)
            .collect();
        if claimants.is_empty() {
            continue;
        }

        // For every cell of a claimant: can the claimant place the single
        // there?
        let mut claimant_cells: HashMap<usize, bool> = HashMap::new();
        for &ci in &claimants {
            let Some(trie) = states[ci].trie() else {
                continue;
            };
            for (pos, &cell) in states[ci].cells().iter().enumerate() {
                let allows = trie.values_at(pos).contains(&single);
                claimant_cells
                    .entry(cell)
                    .and_modify(|a| *a |= allows)
                    .or_insert(allows);
            }
        }

        for vi in 0..states.len() {
            if claimants.contains(&vi) {
                continue;
            }
            let cells = states[vi].cells().to_vec();
            let Some(trie) = states[vi].trie_mut() else {
                continue;
            };
            for (pos, cell) in cells.iter().enumerate() {
                if claimant_cells.get(cell).copied().unwrap_or(false) {
                    continue;
                }
                let removed = trie.remove_at(single, pos);
                if removed > 0 {
                    trace!("single {single} removed {removed} orderings at cell {cell}");
                }
            }
        }
    }
}

/// Mutual arc-consistency across shared cells: a value a vector permits at a
/// shared position must be permitted by every vector sharing that cell, or
/// it is removed.
fn reduce_by_intersections(states: &mut [VectorState]) {
    let mut order: Vec<usize> = (0..states.len()).collect();
    order.sort_by_key(|&i| states[i].solution_estimate());

    for vi in order {
        let mut removals: Vec<(i32, usize)> = Vec::new();
        {
            let Some(trie) = states[vi].trie() else {
                continue;
            };
            for (pos, &cell) in states[vi].cells().iter().enumerate() {
                let here = trie.values_at(pos);
                for (oi, other) in states.iter().enumerate() {
                    if oi == vi {
                        continue;
                    }
                    let Some(opos) = other.cells().iter().position(|&c| c == cell) else {
                        continue;
                    };
                    let Some(other_trie) = other.trie() else {
                        continue;
                    };
                    let allowed = other_trie.values_at(opos);
                    removals.extend(
                        here.iter()
                            .copied()
                            .filter(|v| !allowed.contains(v))
                            .map(|v| (v, pos)),
                    );
                }
            }
        }
        if removals.is_empty() {
            continue;
        }
        let Some(trie) = states[vi].trie_mut() else {
            continue;
        };
        for (value, pos) in removals {
            let removed = trie.remove_at(value, pos);
            if removed > 0 {
                trace!("intersection removed {removed} orderings with {value} at position {pos}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sumlace_core::SumVector;

    use super::*;
    use crate::vector_state::build_vector_states;

    fn build(specs: &[(&[usize], i32)], pool_values: &[i32]) -> (Vec<VectorState>, ValuePool) {
        let vectors: Vec<SumVector> = specs
            .iter()
            .map(|(cells, target)| SumVector::new(cells.to_vec(), *target))
            .collect();
        let pool: ValuePool = pool_values.iter().copied().collect();
        let states = build_vector_states(&vectors, &pool);
        (states, pool)
    }

    #[test]
    fn test_intersection_restricts_shared_cell() {
        // Row [A, B] target 5, column [B, C] target 7, pool {2, 3, 4}.
        // B can only hold 3.
        let (mut states, pool) = build(&[(&[0, 1], 5), (&[1, 11], 7)], &[2, 3, 4]);
        propagate(&mut states, &pool);

        let row = states[0].trie().unwrap();
        let column = states[1].trie().unwrap();
        assert_eq!(row.values_at(1), [3].into_iter().collect());
        assert_eq!(column.values_at(0), [3].into_iter().collect());
        assert_eq!(row.orderings(), vec![vec![2, 3]]);
        assert_eq!(column.orderings(), vec![vec![3, 4]]);
    }

    #[test]
    fn test_shared_positions_agree_after_propagation() {
        let (mut states, pool) =
            build(&[(&[0, 1, 2], 8), (&[2, 12], 9), (&[1, 11], 6)], &[1, 2, 3, 4, 5, 2]);
        propagate(&mut states, &pool);

        for i in 0..states.len() {
            for j in 0..states.len() {
                if i == j {
                    continue;
                }
                for (pi, cell) in states[i].cells().iter().enumerate() {
                    let Some(pj) = states[j].cells().iter().position(|c| c == cell) else {
                        continue;
                    };
                    let (Some(ti), Some(tj)) = (states[i].trie(), states[j].trie()) else {
                        continue;
                    };
                    assert_eq!(
                        ti.values_at(pi),
                        tj.values_at(pj),
                        "vectors {i} and {j} disagree at cell {cell}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_propagation_is_idempotent() {
        let (mut states, pool) = build(&[(&[0, 1], 5), (&[1, 11], 7)], &[2, 3, 4]);
        propagate(&mut states, &pool);
        let snapshot: Vec<_> = states
            .iter()
            .map(|s| s.trie().map(crate::trie::SolutionTrie::orderings))
            .collect();

        propagate(&mut states, &pool);
        let after: Vec<_> = states
            .iter()
            .map(|s| s.trie().map(crate::trie::SolutionTrie::orderings))
            .collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn test_singles_claimed_value_leaves_other_vectors() {
        // 9 occurs once and the first vector needs it in every ordering, so
        // the second (disjoint) vector loses its orderings containing 9.
        let (mut states, pool) = build(
            &[(&[0, 1], 14), (&[10, 11], 13)],
            &[9, 5, 4, 6, 7, 1],
        );
        // First vector: {5, 9} only; second: {4, 9} or {6, 7}.
        propagate(&mut states, &pool);
        let second = states[1].trie().unwrap();
        assert_eq!(second.orderings(), vec![vec![6, 7], vec![7, 6]]);
    }

    #[test]
    fn test_propagation_handles_unsatisfiable_vector() {
        let (mut states, pool) = build(&[(&[0, 1], 100)], &[1, 2, 3]);
        propagate(&mut states, &pool);
        assert!(states[0].trie().unwrap().is_empty());
    }
}
