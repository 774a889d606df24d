//! The dominance partial order on columns and boards.
//!
//! A column dominates another when it is pointwise at least as tall; a
//! board `A` is dominated by `B` when the columns of `A` can be matched
//! one-to-one onto columns of `B` that each dominate them. The matching
//! formulation makes the order invariant under column permutation, which
//! is what lets the archive recognize a position it has seen "up to
//! shuffling columns".

use crate::matching::max_bipartite_matching;
use crate::Board;

/// Which directions of the order a caller is interested in. Restricting
/// the purpose lets `compare_boards` skip half of the matching work and
/// take cheap early rejections.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Purpose {
    /// Only report whether the first board is dominated by the second.
    Less,
    /// Only report whether the first board dominates the second.
    Greater,
    /// Decide the relation exactly.
    Both,
}

/// Outcome of a comparison under the partial order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompResult {
    Less,
    Greater,
    Equal,
    Incomparable,
}

impl CompResult {
    /// The result as seen from the other operand.
    #[inline]
    pub fn reversed(self) -> CompResult {
        match self {
            CompResult::Less => CompResult::Greater,
            CompResult::Greater => CompResult::Less,
            other => other,
        }
    }

    /// Whether the result is `Less` or `Equal`.
    #[inline]
    pub fn is_le(self) -> bool {
        matches!(self, CompResult::Less | CompResult::Equal)
    }

    /// Whether the result is `Greater` or `Equal`.
    #[inline]
    pub fn is_ge(self) -> bool {
        matches!(self, CompResult::Greater | CompResult::Equal)
    }
}

/// Compare two descending-sorted columns pointwise. A missing entry (the
/// shorter column) counts as -1, the minimum row.
pub fn compare_sorted_cols(col1: &[i32], col2: &[i32]) -> CompResult {
    let len = col1.len().max(col2.len());
    let mut col1_is_less = true;
    let mut col2_is_less = true;

    for i in 0..len {
        let a = col1.get(i).copied().unwrap_or(-1);
        let b = col2.get(i).copied().unwrap_or(-1);
        if a > b {
            col1_is_less = false;
        }
        if b > a {
            col2_is_less = false;
        }
    }

    match (col1_is_less, col2_is_less) {
        (true, true) => CompResult::Equal,
        (true, false) => CompResult::Less,
        (false, true) => CompResult::Greater,
        (false, false) => CompResult::Incomparable,
    }
}

/// Compare two boards under the dominance partial order.
///
/// With `Purpose::Less` the result is accurate whenever it is `Less`, and
/// `Incomparable` otherwise (symmetrically for `Greater`); `Purpose::Both`
/// is accurate in all cases. Boards of different dimensions are
/// incomparable.
pub fn compare_boards(board1: &Board, board2: &Board, purpose: Purpose) -> CompResult {
    if board1.n() != board2.n() || board1.k() != board2.k() {
        return CompResult::Incomparable;
    }
    let n = board1.n();

    let mut try_less = purpose != Purpose::Greater;
    let mut try_greater = purpose != Purpose::Less;

    // Cheap rejections: chip counts, then the sorted tallest-chip vectors.
    // Any matching witnessing "less" would contradict either test.
    if try_less && board1.num_chips() > board2.num_chips() {
        try_less = false;
    }
    if try_greater && board1.num_chips() < board2.num_chips() {
        try_greater = false;
    }

    if (try_less || try_greater) && n > 0 && board1.k() > 0 {
        let mut tops1: Vec<i32> = (0..n).map(|c| board1.chip_row(c, 0)).collect();
        let mut tops2: Vec<i32> = (0..n).map(|c| board2.chip_row(c, 0)).collect();
        tops1.sort_unstable();
        tops2.sort_unstable();
        for i in 0..n {
            if tops1[i] > tops2[i] {
                try_less = false;
            }
            if tops1[i] < tops2[i] {
                try_greater = false;
            }
        }
    }

    if !try_less && !try_greater {
        return CompResult::Incomparable;
    }

    let cols1: Vec<_> = (0..n).map(|c| board1.column_rows(c)).collect();
    let cols2: Vec<_> = (0..n).map(|c| board2.column_rows(c)).collect();

    let first_is_less = try_less && has_dominating_matching(&cols1, &cols2);
    let second_is_less = try_greater && has_dominating_matching(&cols2, &cols1);

    match (first_is_less, second_is_less) {
        (true, true) => CompResult::Equal,
        (true, false) => CompResult::Less,
        (false, true) => CompResult::Greater,
        (false, false) => CompResult::Incomparable,
    }
}

/// Whether every column of `small` can be matched onto a distinct column
/// of `large` that dominates it (a perfect matching in the compatibility
/// graph).
fn has_dominating_matching(small: &[Vec<i32>], large: &[Vec<i32>]) -> bool {
    let n = small.len();
    let mut adj = vec![Vec::new(); n];
    for (i, col1) in small.iter().enumerate() {
        for (j, col2) in large.iter().enumerate() {
            if compare_sorted_cols(col1, col2).is_le() {
                adj[i].push(j);
            }
        }
    }
    max_bipartite_matching(n, n, &adj) == n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: Vec<Vec<i32>>) -> Board {
        let n = rows.len();
        let k = rows.first().map_or(0, |c| c.len());
        Board::from_rows(n, k, rows)
    }

    #[test]
    fn test_compare_sorted_cols_basic() {
        assert_eq!(compare_sorted_cols(&[2, 1], &[2, 1]), CompResult::Equal);
        assert_eq!(compare_sorted_cols(&[1, 0], &[2, 1]), CompResult::Less);
        assert_eq!(compare_sorted_cols(&[3, 0], &[2, 1]), CompResult::Incomparable);
        assert_eq!(compare_sorted_cols(&[2, -1], &[1, -1]), CompResult::Greater);
    }

    #[test]
    fn test_compare_sorted_cols_pads_with_removed() {
        assert_eq!(compare_sorted_cols(&[2], &[2, -1]), CompResult::Equal);
        assert_eq!(compare_sorted_cols(&[2], &[2, 0]), CompResult::Less);
    }

    #[test]
    fn test_dimension_mismatch_incomparable() {
        let a = board(vec![vec![0, 0]]);
        let b = board(vec![vec![0], vec![0]]);
        assert_eq!(compare_boards(&a, &b, Purpose::Both), CompResult::Incomparable);
    }

    #[test]
    fn test_equal_up_to_column_permutation() {
        let a = board(vec![vec![2, 0], vec![1, -1]]);
        let b = board(vec![vec![1, -1], vec![2, 0]]);
        assert_eq!(compare_boards(&a, &b, Purpose::Both), CompResult::Equal);
    }

    #[test]
    fn test_uniformly_taller_board_is_greater() {
        let a = board(vec![vec![6, 6, 6], vec![6, 6, 6], vec![-1, -1, -1]]);
        let b = board(vec![vec![5, 5, 5], vec![5, 5, 5], vec![-1, -1, -1]]);
        assert_eq!(compare_boards(&a, &b, Purpose::Both), CompResult::Greater);
        assert_eq!(compare_boards(&b, &a, Purpose::Both), CompResult::Less);
    }

    #[test]
    fn test_same_tops_internal_order_differs() {
        // Equal multisets of top rows, but no column-to-column matching
        // works in either direction.
        let a = board(vec![vec![6, 4, 2], vec![5, 3, 1], vec![-1, -1, -1]]);
        let b = board(vec![vec![6, 2, 1], vec![5, 4, 2], vec![-1, -1, -1]]);
        assert_eq!(compare_boards(&a, &b, Purpose::Both), CompResult::Incomparable);
    }

    #[test]
    fn test_reflexivity() {
        let a = board(vec![vec![3, 1, -1], vec![0, 0, 0]]);
        assert_eq!(compare_boards(&a, &a, Purpose::Both), CompResult::Equal);
    }

    #[test]
    fn test_purpose_scoping_agrees_with_both() {
        let a = board(vec![vec![1, 0], vec![0, -1]]);
        let b = board(vec![vec![2, 1], vec![1, 0]]);
        assert_eq!(compare_boards(&a, &b, Purpose::Both), CompResult::Less);
        assert_eq!(compare_boards(&a, &b, Purpose::Less), CompResult::Less);
        // Asking only for Greater must not invent one.
        assert_eq!(compare_boards(&a, &b, Purpose::Greater), CompResult::Incomparable);
    }

    #[test]
    fn test_purpose_greater_reports_equal_boards_as_greater() {
        // With a one-sided purpose an equality witness still satisfies the
        // requested direction.
        let a = board(vec![vec![1, -1]]);
        let b = board(vec![vec![1, -1]]);
        assert_eq!(compare_boards(&a, &b, Purpose::Greater), CompResult::Greater);
        assert_eq!(compare_boards(&a, &b, Purpose::Less), CompResult::Less);
    }

    #[test]
    fn test_chip_count_rejection() {
        let a = board(vec![vec![5, 5]]);
        let b = board(vec![vec![0, -1]]);
        // a has more chips, so a <= b is impossible no matter the rows.
        assert_eq!(compare_boards(&a, &b, Purpose::Less), CompResult::Incomparable);
        assert_eq!(compare_boards(&a, &b, Purpose::Both), CompResult::Greater);
    }

    #[test]
    fn test_matching_requires_distinct_targets() {
        // Both columns of `a` fit under the tall column of `b`, but they
        // cannot share it; the short column of `b` covers neither.
        let a = board(vec![vec![2, 1], vec![2, 1]]);
        let b = board(vec![vec![9, 9], vec![2, 0]]);
        assert_eq!(compare_boards(&a, &b, Purpose::Less), CompResult::Incomparable);
    }

    #[test]
    fn test_transitivity_sample() {
        let a = board(vec![vec![0, -1], vec![1, 0]]);
        let b = board(vec![vec![1, 0], vec![1, 0]]);
        let c = board(vec![vec![2, 0], vec![1, 1]]);
        assert_eq!(compare_boards(&a, &b, Purpose::Both), CompResult::Less);
        assert_eq!(compare_boards(&b, &c, Purpose::Both), CompResult::Less);
        assert_eq!(compare_boards(&a, &c, Purpose::Both), CompResult::Less);
    }
}
