//! Compact encodings used while pruning Pusher moves.
//!
//! # Per-column move masks
//!
//! A move restricted to one column is a K-bit mask: bit `i` (LSB-first)
//! pushes the chip in slot `i`. Since removed chips cluster at a column's
//! tail, masks over the first `k'` bits enumerate exactly the moves on the
//! `k'` surviving chips.
//!
//! # Column-state codes
//!
//! A column state is encoded in base `G + 2`, one digit `row + 1` per slot,
//! which is collision-free for the row range `[-1, G]` a game toward goal
//! `G` can produce. Two masks whose results encode equally are the same
//! move for pruning purposes.

use crate::ColumnState;

/// A per-column Pusher move, one bit per slot.
pub type ColumnMask = u64;

/// Count the chips of a column that are still on the board.
pub fn movable_chips(col: &ColumnState) -> usize {
    col.iter().filter(|&&row| row != -1).count()
}

/// Apply a move mask to a copy of `col`: push each selected surviving chip
/// one row and re-sort descending.
pub fn apply_mask_to_column(col: &ColumnState, mask: ColumnMask) -> ColumnState {
    let mut result: ColumnState = col
        .iter()
        .enumerate()
        .map(|(idx, &row)| {
            if row != -1 && mask & (1 << idx) != 0 {
                row + 1
            } else {
                row
            }
        })
        .collect();
    result.sort_unstable_by(|a, b| b.cmp(a));
    result
}

/// Encode a column state as a base-`(goal + 2)` integer.
pub fn encode_column(col: &ColumnState, goal: i32) -> u128 {
    let base = (goal + 2) as u128;
    col.iter()
        .fold(0u128, |code, &row| code * base + (row + 1) as u128)
}

/// Expand a mask on column `col` into flat slot indices, appending to `out`.
pub fn decode_mask(mask: ColumnMask, k: usize, col: usize, out: &mut Vec<usize>) {
    for idx in 0..k {
        if mask & (1 << idx) != 0 {
            out.push(col * k + idx);
        }
    }
}
