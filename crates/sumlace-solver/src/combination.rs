//! Enumeration of pool combinations matching a vector's length and target.

use sumlace_core::ValuePool;

/// Returns every distinct ascending multiset of `len` pool values summing to
/// `target`.
///
/// Selection descends the pool's distinct values in ascending order, taking
/// up to each value's multiplicity, so the output carries no duplicates and
/// every combination is already sorted.
pub(crate) fn combinations(pool: &ValuePool, len: usize, target: i32) -> Vec<Vec<i32>> {
    let distinct: Vec<(i32, u32)> = pool.distinct().collect();
    let mut current = Vec::with_capacity(len);
    let mut accepted = Vec::new();
    descend(&distinct, 0, len, target, &mut current, &mut accepted);
    accepted
}

fn descend(
    distinct: &[(i32, u32)],
    index: usize,
    remaining: usize,
    target: i32,
    current: &mut Vec<i32>,
    accepted: &mut Vec<Vec<i32>>,
) {
    if remaining == 0 {
        if target == 0 {
            accepted.push(current.clone());
        }
        return;
    }
    let Some(&(value, count)) = distinct.get(index) else {
        return;
    };

    let max_take = remaining.min(count as usize);
    for take in 0..=max_take {
        #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let taken_sum = value * take as i32;
        current.extend(std::iter::repeat_n(value, take));
        descend(
            distinct,
            index + 1,
            remaining - take,
            target - taken_sum,
            current,
            accepted,
        );
        current.truncate(current.len() - take);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(values: &[i32]) -> ValuePool {
        values.iter().copied().collect()
    }

    #[test]
    fn test_accepts_only_matching_sums() {
        // Pool [2, 3, 4], pairs summing to 5: only {2, 3}.
        let combos = combinations(&pool(&[2, 3, 4]), 2, 5);
        assert_eq!(combos, vec![vec![2, 3]]);
    }

    #[test]
    fn test_combinations_are_sorted_and_distinct() {
        let combos = combinations(&pool(&[1, 2, 3, 4, 5]), 3, 8);
        assert_eq!(combos, vec![vec![1, 2, 5], vec![1, 3, 4]]);
    }

    #[test]
    fn test_respects_multiplicity() {
        // Only two 3s are available, so {3, 3, 3} must not appear.
        let combos = combinations(&pool(&[3, 3, 6]), 2, 6);
        assert_eq!(combos, vec![vec![3, 3]]);
        let combos = combinations(&pool(&[3, 3, 6]), 3, 9);
        assert!(combos.is_empty());
    }

    #[test]
    fn test_duplicate_values_yield_one_combination() {
        // Position-wise selection of equal values collapses to one multiset.
        let combos = combinations(&pool(&[2, 2, 3]), 2, 5);
        assert_eq!(combos, vec![vec![2, 3]]);
    }

    #[test]
    fn test_negative_values() {
        let combos = combinations(&pool(&[-2, 3, 4, 5]), 2, 1);
        assert_eq!(combos, vec![vec![-2, 3]]);
    }

    #[test]
    fn test_unreachable_target_is_empty() {
        assert!(combinations(&pool(&[1, 2]), 2, 100).is_empty());
    }
}
