//! The parallel, first-solution-wins backtracking search.

use std::{
    cmp::Reverse,
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
};

use log::debug;
use rayon::prelude::*;
use sumlace_core::ValuePool;

use crate::{
    assignment::Assignment,
    progress::{CancelToken, ProgressTracker},
    trie::{SolutionTrie, TrieCursor},
    vector_state::VectorState,
};

/// Branch counts at or above this fan out onto the rayon pool.
const PARALLEL_BRANCH_MIN: usize = 16;

/// Runs the race between the two heuristic vector orderings.
///
/// Each ordering searches on its own thread; the first complete assignment
/// sent down the results channel wins and flips the shared race flag so the
/// loser unwinds at its next frame transition. Returns `None` when both
/// orderings exhaust their search space (or are canceled).
pub(crate) fn run_search(
    vectors: &[VectorState],
    pool: &ValuePool,
    cancel: &CancelToken,
    progress: &ProgressTracker,
) -> Option<Assignment> {
    let mut orders = vec![overlap_order(vectors)];
    let diversified = solution_count_order(vectors);
    if diversified != orders[0] {
        orders.push(diversified);
    }

    let race = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<Option<Assignment>>();

    thread::scope(|scope| {
        for order in orders {
            let tx = tx.clone();
            let race = &race;
            scope.spawn(move || {
                debug!("searching vector order {order:?}");
                let run = SearchRun::new(vectors, order, cancel, race, progress);
                let result = run.solve_from(0, Assignment::new(), pool.clone());
                let _ = tx.send(result);
            });
        }
        drop(tx);

        let mut winner = None;
        while let Ok(result) = rx.recv() {
            if let Some(assignment) = result
                && winner.is_none()
            {
                race.store(true, Ordering::Release);
                winner = Some(assignment);
            }
        }
        winner
    })
}

/// Greedy ordering maximizing the overlap with already-covered cells; ties
/// prefer fewer remaining solutions, then the lowest starting cell, then the
/// extraction order.
fn overlap_order(vectors: &[VectorState]) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..vectors.len()).collect();
    let mut covered: HashSet<usize> = HashSet::new();
    let mut order = Vec::with_capacity(vectors.len());

    while !remaining.is_empty() {
        let best = remaining
            .iter()
            .enumerate()
            .min_by_key(|&(_, &v)| {
                let overlap = vectors[v]
                    .cells()
                    .iter()
                    .filter(|c| covered.contains(*c))
                    .count();
                (
                    Reverse(overlap),
                    vectors[v].solution_estimate(),
                    vectors[v].start(),
                    v,
                )
            })
            .map(|(i, _)| i);
        let Some(idx) = best else { break };
        let v = remaining.swap_remove(idx);
        covered.extend(vectors[v].cells().iter().copied());
        order.push(v);
    }
    order
}

/// Diversified ordering: plain ascending solution count.
fn solution_count_order(vectors: &[VectorState]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..vectors.len()).collect();
    order.sort_by_key(|&v| (vectors[v].solution_estimate(), vectors[v].start(), v));
    order
}

/// Signature of a search state: processing depth, remaining pool, and the
/// assignments of every cell still relevant to the unplaced vectors.
type MemoKey = (usize, ValuePool, Vec<Option<i32>>);

/// One ordering's search over the shared vector states.
struct SearchRun<'a> {
    vectors: &'a [VectorState],
    order: Vec<usize>,
    /// Per depth: sorted cells of the vectors not yet placed.
    relevant: Vec<Vec<usize>>,
    cancel: &'a CancelToken,
    race: &'a AtomicBool,
    progress: &'a ProgressTracker,
    memo: Mutex<HashSet<MemoKey>>,
}

/// One node of the explicit depth-first stack within a vector.
struct Frame<'t> {
    node: TrieCursor<'t>,
    position: usize,
    assignment: Assignment,
    pool: ValuePool,
}

impl<'a> SearchRun<'a> {
    fn new(
        vectors: &'a [VectorState],
        order: Vec<usize>,
        cancel: &'a CancelToken,
        race: &'a AtomicBool,
        progress: &'a ProgressTracker,
    ) -> Self {
        let relevant = (0..order.len())
            .map(|depth| {
                let mut cells: Vec<usize> = order[depth..]
                    .iter()
                    .flat_map(|&v| vectors[v].cells().iter().copied())
                    .collect();
                cells.sort_unstable();
                cells.dedup();
                cells
            })
            .collect();
        Self {
            vectors,
            order,
            relevant,
            cancel,
            race,
            progress,
            memo: Mutex::new(HashSet::new()),
        }
    }

    fn is_canceled(&self) -> bool {
        self.cancel.is_canceled() || self.race.load(Ordering::Acquire)
    }

    /// Places the vector at `depth` in the processing order, then descends.
    fn solve_from(&self, depth: usize, assignment: Assignment, pool: ValuePool) -> Option<Assignment> {
        if self.is_canceled() {
            return None;
        }
        if depth == self.order.len() {
            return Some(assignment);
        }
        if !self.record_visit(depth, &assignment, &pool) {
            // An identical state was already explored along another branch.
            return None;
        }

        let vector = &self.vectors[self.order[depth]];
        let trie = vector.resolve_trie(&assignment, &pool);
        if trie.is_empty() {
            return None;
        }
        self.explore(vector, &trie, depth, &assignment, &pool)
    }

    fn record_visit(&self, depth: usize, assignment: &Assignment, pool: &ValuePool) -> bool {
        let key = (
            depth,
            pool.clone(),
            self.relevant[depth]
                .iter()
                .map(|&cell| assignment.get(cell))
                .collect(),
        );
        self.memo.lock().map_or(true, |mut seen| seen.insert(key))
    }

    /// Explores one vector's resolved trie, fanning wide branch sets out
    /// onto the thread pool.
    fn explore(
        &self,
        vector: &VectorState,
        trie: &SolutionTrie,
        depth: usize,
        assignment: &Assignment,
        pool: &ValuePool,
    ) -> Option<Assignment> {
        let root = trie.root();
        let parallel =
            (depth == 0 && root.child_count() > 1) || root.child_count() >= PARALLEL_BRANCH_MIN;

        if parallel {
            let branches: Vec<(i32, TrieCursor<'_>)> = root.children().collect();
            branches.into_par_iter().find_map_any(|(value, node)| {
                let frame = self.branch_frame(vector, assignment, pool, value, node)?;
                self.run_stack(vector, depth, vec![frame])
            })
        } else {
            let frames: Vec<Frame<'_>> = root
                .children()
                .rev()
                .filter_map(|(value, node)| self.branch_frame(vector, assignment, pool, value, node))
                .collect();
            self.run_stack(vector, depth, frames)
        }
    }

    /// Builds the frame entering a vector through one top-level branch.
    fn branch_frame<'t>(
        &self,
        vector: &VectorState,
        assignment: &Assignment,
        pool: &ValuePool,
        value: i32,
        node: TrieCursor<'t>,
    ) -> Option<Frame<'t>> {
        let cell = vector.cells()[0];
        match assignment.get(cell) {
            Some(fixed) if fixed == value => Some(Frame {
                node,
                position: 1,
                assignment: assignment.clone(),
                pool: pool.clone(),
            }),
            Some(_) => None,
            None => {
                let mut pool = pool.clone();
                pool.take(value).then(|| {
                    let mut assignment = assignment.clone();
                    assignment.set(cell, value);
                    Frame {
                        node,
                        position: 1,
                        assignment,
                        pool,
                    }
                })
            }
        }
    }

    /// Depth-first exploration of one vector over an explicit stack.
    ///
    /// A cell already assigned by an earlier vector only descends the
    /// matching branch; a free cell branches over every child value the
    /// local pool still holds, each branch owning its own state. Completing
    /// the vector hands control to the next one in the order.
    fn run_stack(
        &self,
        vector: &VectorState,
        depth: usize,
        mut stack: Vec<Frame<'_>>,
    ) -> Option<Assignment> {
        while let Some(frame) = stack.pop() {
            if self.is_canceled() {
                return None;
            }
            if frame.position == vector.len() {
                self.progress.add_completed(1);
                if let Some(solution) = self.solve_from(depth + 1, frame.assignment, frame.pool) {
                    return Some(solution);
                }
                continue;
            }

            let cell = vector.cells()[frame.position];
            for (value, node) in frame.node.children().rev() {
                match frame.assignment.get(cell) {
                    Some(fixed) if fixed == value => stack.push(Frame {
                        node,
                        position: frame.position + 1,
                        assignment: frame.assignment.clone(),
                        pool: frame.pool.clone(),
                    }),
                    Some(_) => {}
                    None => {
                        let mut pool = frame.pool.clone();
                        if pool.take(value) {
                            let mut assignment = frame.assignment.clone();
                            assignment.set(cell, value);
                            stack.push(Frame {
                                node,
                                position: frame.position + 1,
                                assignment,
                                pool,
                            });
                        }
                    }
                }
            }
        }
        None
    }
}
