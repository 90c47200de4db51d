//! Pareto dominance utilities for multi-objective best-trial computation.

use crate::types::Direction;

/// Returns `true` if solution `a` Pareto-dominates solution `b`.
///
/// A solution dominates another if it is at least as good in all objectives
/// and strictly better in at least one, respecting the given directions.
pub(crate) fn dominates(a: &[f64], b: &[f64], directions: &[Direction]) -> bool {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len(), directions.len());

    let mut strictly_better = false;
    for ((&av, &bv), dir) in a.iter().zip(b.iter()).zip(directions.iter()) {
        if dir.improves(bv, av) {
            return false;
        }
        if dir.improves(av, bv) {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Indices of the non-dominated solutions in `values`.
///
/// Output order follows input order. Duplicated objective vectors are all
/// kept — none of them dominates the others.
///
/// Complexity: O(M * N^2) where M = objectives, N = solutions.
pub(crate) fn non_dominated_front(values: &[Vec<f64>], directions: &[Direction]) -> Vec<usize> {
    (0..values.len())
        .filter(|&i| {
            !values
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && dominates(other, &values[i], directions))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN2: [Direction; 2] = [Direction::Minimize, Direction::Minimize];

    #[test]
    fn dominates_basic() {
        assert!(dominates(&[1.0, 1.0], &[2.0, 2.0], &MIN2));
        assert!(!dominates(&[2.0, 2.0], &[1.0, 1.0], &MIN2));
        // Equal does not dominate
        assert!(!dominates(&[1.0, 1.0], &[1.0, 1.0], &MIN2));
    }

    #[test]
    fn dominates_incomparable() {
        assert!(!dominates(&[1.0, 3.0], &[3.0, 1.0], &MIN2));
        assert!(!dominates(&[3.0, 1.0], &[1.0, 3.0], &MIN2));
    }

    #[test]
    fn dominates_mixed_directions() {
        let dirs = [Direction::Maximize, Direction::Minimize];
        assert!(dominates(&[5.0, 1.0], &[3.0, 2.0], &dirs));
        assert!(!dominates(&[3.0, 2.0], &[5.0, 1.0], &dirs));
    }

    #[test]
    fn front_keeps_all_mutually_non_dominated() {
        let values = vec![vec![1.0, 5.0], vec![2.0, 3.0], vec![4.0, 1.0]];
        assert_eq!(non_dominated_front(&values, &MIN2), vec![0, 1, 2]);
    }

    #[test]
    fn front_drops_dominated() {
        let values = vec![
            vec![1.0, 5.0],
            vec![5.0, 1.0],
            vec![3.0, 3.0],
            vec![4.0, 4.0], // dominated by (3, 3)
        ];
        assert_eq!(non_dominated_front(&values, &MIN2), vec![0, 1, 2]);
    }

    #[test]
    fn front_of_empty_is_empty() {
        assert!(non_dominated_front(&[], &MIN2).is_empty());
    }

    #[test]
    fn duplicates_all_survive() {
        let values = vec![vec![2.0, 2.0], vec![2.0, 2.0]];
        assert_eq!(non_dominated_front(&values, &MIN2), vec![0, 1]);
    }
}
