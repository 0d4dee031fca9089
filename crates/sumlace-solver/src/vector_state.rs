//! Solver-side vector state: generation and on-demand trie resolution.

use log::debug;
use rayon::prelude::*;
use sumlace_core::{SumVector, ValuePool};

use crate::{
    assignment::Assignment, combination::combinations, expand::expand_orderings,
    trie::SolutionTrie,
};

/// Vectors longer than this are candidates for lazy population.
const LAZY_LENGTH_THRESHOLD: usize = 7;

/// Accepted-combination count at which a long vector defers expansion.
const LAZY_COMBINATION_THRESHOLD: usize = 5000;

/// How a vector's orderings are materialized.
#[derive(Debug, Clone)]
pub(crate) enum TrieSource {
    /// The trie was built up front and is pruned by propagation.
    Eager(SolutionTrie),
    /// Expansion was deferred; orderings are regenerated against the live
    /// pool and assignment when the search reaches the vector.
    Lazy,
}

/// A vector prepared for solving.
#[derive(Debug, Clone)]
pub(crate) struct VectorState {
    cells: Vec<usize>,
    target: i32,
    source: TrieSource,
}

impl VectorState {
    pub(crate) fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn start(&self) -> usize {
        self.cells[0]
    }

    pub(crate) fn is_lazy(&self) -> bool {
        matches!(self.source, TrieSource::Lazy)
    }

    /// The eager trie, if the vector has one.
    pub(crate) fn trie(&self) -> Option<&SolutionTrie> {
        match &self.source {
            TrieSource::Eager(trie) => Some(trie),
            TrieSource::Lazy => None,
        }
    }

    pub(crate) fn trie_mut(&mut self) -> Option<&mut SolutionTrie> {
        match &mut self.source {
            TrieSource::Eager(trie) => Some(trie),
            TrieSource::Lazy => None,
        }
    }

    /// Solution count used by the ordering heuristics; lazy vectors sort
    /// last.
    pub(crate) fn solution_estimate(&self) -> u64 {
        self.trie().map_or(u64::MAX, SolutionTrie::solution_count)
    }

    /// Builds the trie the search explores for this vector under the given
    /// state.
    ///
    /// Eager tries are filtered down to the orderings consistent with the
    /// assignment and the remaining pool; lazy vectors regenerate from
    /// scratch against that same state.
    pub(crate) fn resolve_trie(&self, assignment: &Assignment, pool: &ValuePool) -> SolutionTrie {
        let fixed: Vec<Option<i32>> = self.cells.iter().map(|&c| assignment.get(c)).collect();
        match &self.source {
            TrieSource::Eager(trie) => trie.filter_for_state(&fixed, pool),
            TrieSource::Lazy => self.populate_for_state(&fixed, pool),
        }
    }

    /// Drops the eager trie so tests can exercise the lazy path.
    #[cfg(test)]
    pub(crate) fn forced_lazy(mut self) -> Self {
        self.source = TrieSource::Lazy;
        self
    }

    fn populate_for_state(&self, fixed: &[Option<i32>], pool: &ValuePool) -> SolutionTrie {
        let fixed_sum: i32 = fixed.iter().flatten().sum();
        let free: Vec<usize> = fixed
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.is_none().then_some(i))
            .collect();

        let mut trie = SolutionTrie::new();
        if free.is_empty() {
            if fixed_sum == self.target {
                let ordering: Vec<i32> = fixed.iter().flatten().copied().collect();
                trie.insert(&ordering);
            }
            return trie;
        }

        let mut full: Vec<i32> = fixed.iter().map(|f| f.unwrap_or(0)).collect();
        for combo in combinations(pool, free.len(), self.target - fixed_sum) {
            // Every remaining position can matter to later vectors, so keep
            // each distinct arrangement of the free slots.
            for perm in expand_orderings(&combo, &[]) {
                for (&slot, &value) in free.iter().zip(&perm) {
                    full[slot] = value;
                }
                trie.insert(&full);
            }
        }
        trie
    }
}

/// Generates a [`VectorState`] per extracted vector, in parallel.
pub(crate) fn build_vector_states(vectors: &[SumVector], pool: &ValuePool) -> Vec<VectorState> {
    let intersection_sets: Vec<Vec<usize>> = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.cells()
                .iter()
                .enumerate()
                .filter_map(|(pos, cell)| {
                    let shared = vectors
                        .iter()
                        .enumerate()
                        .any(|(j, other)| i != j && other.cells().contains(cell));
                    shared.then_some(pos)
                })
                .collect()
        })
        .collect();

    vectors
        .par_iter()
        .zip(intersection_sets)
        .map(|(vector, intersections)| {
            let combos = combinations(pool, vector.len(), vector.target());
            let source = if vector.len() > LAZY_LENGTH_THRESHOLD
                && combos.len() >= LAZY_COMBINATION_THRESHOLD
            {
                debug!(
                    "vector at {} defers expansion ({} combinations of length {})",
                    vector.start(),
                    combos.len(),
                    vector.len()
                );
                TrieSource::Lazy
            } else {
                let mut trie = SolutionTrie::new();
                let expanded: Vec<Vec<Vec<i32>>> = combos
                    .par_iter()
                    .map(|combo| expand_orderings(combo, &intersections))
                    .collect();
                for orderings in expanded {
                    for ordering in orderings {
                        trie.insert(&ordering);
                    }
                }
                TrieSource::Eager(trie)
            };
            VectorState {
                cells: vector.cells().to_vec(),
                target: vector.target(),
                source,
            }
        })
        .collect()
}
