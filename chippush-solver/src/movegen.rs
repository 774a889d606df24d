//! Pruned move generation.
//!
//! The raw move lists are hopeless (the Pusher alone has `2^chips - 1`
//! subsets), but most moves are interchangeable. Columns with identical
//! contents are interchangeable, so are two per-column moves producing the
//! same resulting column, and a move whose outcome is dominated by another
//! enumerated move can never be the unique best choice. The generators
//! here collapse all three kinds of redundancy before the search descends.

use std::collections::HashSet;

use itertools::Itertools;

use chippush_core::compare::{compare_boards, compare_sorted_cols, CompResult, Purpose};
use chippush_core::encoding::{
    apply_mask_to_column, decode_mask, encode_column, movable_chips, ColumnMask,
};
use chippush_core::{Board, ColumnState, GameState, Player, PusherMove, RemoverMove};

/// All successor states of `state` under the pruned move lists, in the
/// heuristic exploration order. Empty once the game is over.
pub fn step_pruned(state: &GameState) -> Vec<GameState> {
    match state.current_player() {
        Some(Player::Pusher) => pruned_pusher_moves(state)
            .iter()
            .map(|mv| {
                let mut next = state.clone();
                next.apply_pusher(mv);
                next
            })
            .collect(),
        Some(Player::Remover) => pruned_remover_moves(state)
            .into_iter()
            .map(|mv| {
                let mut next = state.clone();
                next.apply_remover(mv);
                next
            })
            .collect(),
        None => Vec::new(),
    }
}

/// Pruned Pusher moves, largest pushes first.
///
/// Non-symmetric games go through the four-phase column-equivalence
/// reduction; symmetric games enumerate chip-ID sets and deduplicate by
/// resulting position.
pub fn pruned_pusher_moves(state: &GameState) -> Vec<PusherMove> {
    if state.symmetric() {
        return pruned_symmetric_pusher_moves(state);
    }

    let board = state.board();
    let k = board.k();
    let cols: Vec<ColumnState> = (0..board.n()).map(|c| board.column_rows(c)).collect();

    // Phase 1: group interchangeable columns.
    let classes = column_classes(&cols);

    // Phases 2 and 3, per class.
    let class_moves: Vec<Vec<PusherMove>> = classes
        .iter()
        .map(|class| {
            let masks = distinct_column_masks(&cols[class[0]], state.goal());
            combine_class_moves(class, &masks, k)
        })
        .collect();

    // Phase 4: one selection per class, flattened to flat slot indices.
    let mut moves: Vec<PusherMove> = class_moves
        .iter()
        .multi_cartesian_product()
        .map(|parts| parts.into_iter().flatten().copied().collect::<PusherMove>())
        .filter(|mv| !mv.is_empty())
        .collect();

    moves.sort_by(|a, b| b.len().cmp(&a.len()));
    moves
}

/// Pruned Remover moves: column choices whose resulting board is not
/// dominated by (or equal to) another choice's.
pub fn pruned_remover_moves(state: &GameState) -> Vec<RemoverMove> {
    let board = state.board();
    let n = board.n();

    let mut selected = vec![true; n];
    let mut after: Vec<Board> = Vec::with_capacity(n);
    for c in 0..n {
        let mut next = board.clone();
        if !next.apply_remover(c) {
            selected[c] = false;
        }
        after.push(next);
    }

    // The Remover wants to hand the Pusher the smallest board: drop any
    // choice whose result dominates another surviving choice's result.
    for c2 in 0..n {
        if !selected[c2] {
            continue;
        }
        for c1 in 0..c2 {
            if !selected[c1] {
                continue;
            }
            match compare_boards(&after[c2], &after[c1], Purpose::Both) {
                CompResult::Greater | CompResult::Equal => selected[c2] = false,
                CompResult::Less => selected[c1] = false,
                CompResult::Incomparable => {}
            }
            if !selected[c2] {
                break;
            }
        }
    }

    (0..n).filter(|&c| selected[c]).collect()
}

/// Phase 1: partition column indices into classes of identical columns.
fn column_classes(cols: &[ColumnState]) -> Vec<Vec<usize>> {
    let mut classes: Vec<Vec<usize>> = Vec::new();
    let mut assigned = vec![false; cols.len()];

    for c1 in 0..cols.len() {
        if assigned[c1] {
            continue;
        }
        assigned[c1] = true;
        let mut class = vec![c1];
        for c2 in c1 + 1..cols.len() {
            if !assigned[c2] && compare_sorted_cols(&cols[c1], &cols[c2]) == CompResult::Equal {
                assigned[c2] = true;
                class.push(c2);
            }
        }
        classes.push(class);
    }
    classes
}

/// Phase 2: one representative mask per distinct resulting column state.
/// Masks range over the surviving chips only (they occupy the column's
/// leading slots). The empty mask always survives as index 0.
fn distinct_column_masks(col: &ColumnState, goal: i32) -> Vec<(ColumnMask, ColumnState)> {
    let movable = movable_chips(col);
    let mut seen = HashSet::new();
    let mut masks = Vec::new();

    for mask in 0..(1u64 << movable) {
        let result = apply_mask_to_column(col, mask);
        if seen.insert(encode_column(&result, goal)) {
            masks.push((mask, result));
        }
    }
    masks
}

/// Phase 3: assign a per-column move to each of a class's columns.
///
/// Interchangeable columns make any permutation of an assignment the same
/// move, so only non-decreasing index tuples are generated; a tuple whose
/// entries produce comparable columns is dropped because the lesser entry
/// is redundant against the other.
fn combine_class_moves(
    class: &[usize],
    masks: &[(ColumnMask, ColumnState)],
    k: usize,
) -> Vec<PusherMove> {
    let t = masks.len();

    let mut comparable = vec![vec![false; t]; t];
    for i in 0..t {
        for j in i + 1..t {
            match compare_sorted_cols(&masks[i].1, &masks[j].1) {
                CompResult::Less | CompResult::Greater => {
                    comparable[i][j] = true;
                    comparable[j][i] = true;
                }
                _ => {}
            }
        }
    }

    let mut moves = Vec::new();
    'tuples: for tuple in (0..t).combinations_with_replacement(class.len()) {
        for a in 0..tuple.len() {
            for b in a + 1..tuple.len() {
                if comparable[tuple[a]][tuple[b]] {
                    continue 'tuples;
                }
            }
        }

        let mut mv = PusherMove::new();
        for (pos, &mask_idx) in tuple.iter().enumerate() {
            decode_mask(masks[mask_idx].0, k, class[pos], &mut mv);
        }
        moves.push(mv);
    }
    moves
}

/// Symmetric games: enumerate every nonempty chip-ID set and keep one
/// representative per distinct resulting position (rows and moved flags,
/// up to column permutation). Pure deduplication, no dominance pruning.
fn pruned_symmetric_pusher_moves(state: &GameState) -> Vec<PusherMove> {
    let board = state.board();
    let k = board.k();
    let mut seen = HashSet::new();
    let mut moves: Vec<PusherMove> = Vec::new();

    for mask in 1u64..(1 << k) {
        let ids: PusherMove = (0..k).filter(|&id| mask & (1 << id) != 0).collect();
        let mut next = board.clone();
        if !next.apply_pusher_by_id(&ids) {
            continue;
        }
        let mut key: Vec<u128> = (0..next.n())
            .map(|c| encode_column_with_flags(&next, c, state.goal()))
            .collect();
        key.sort_unstable();
        if seen.insert(key) {
            moves.push(ids);
        }
    }

    moves.sort_by(|a, b| b.len().cmp(&a.len()));
    moves
}

/// Column code that also distinguishes moved flags, so that two ID sets
/// merge only when they produce literally the same position.
fn encode_column_with_flags(board: &Board, c: usize, goal: i32) -> u128 {
    let base = 2 * (goal + 2) as u128;
    (0..board.k()).fold(0u128, |code, idx| {
        let digit = (board.chip_row(c, idx) + 1) as u128 * 2
            + board.chip_is_moved(c, idx) as u128;
        code * base + digit
    })
}
