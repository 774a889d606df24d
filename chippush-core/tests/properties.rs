//! Property-based tests for boards and the dominance order.

use proptest::prelude::*;

use chippush_core::compare::{compare_boards, CompResult, Purpose};
use chippush_core::Board;

/// Strategy: a board with 1-3 columns of 1-3 slots, rows in -1..=4.
fn board_strategy() -> impl Strategy<Value = Board> {
    (1usize..=3, 1usize..=3).prop_flat_map(|(n, k)| {
        prop::collection::vec(prop::collection::vec(-1i32..=4, k), n)
            .prop_map(move |rows| Board::from_rows(n, k, rows))
    })
}

/// Strategy: two boards of the same dimensions.
fn board_pair_strategy() -> impl Strategy<Value = (Board, Board)> {
    (1usize..=3, 1usize..=3).prop_flat_map(|(n, k)| {
        let one = prop::collection::vec(prop::collection::vec(-1i32..=4, k), n);
        let other = prop::collection::vec(prop::collection::vec(-1i32..=4, k), n);
        (one, other).prop_map(move |(a, b)| (Board::from_rows(n, k, a), Board::from_rows(n, k, b)))
    })
}

proptest! {
    // 1. Columns come out sorted descending with -1 confined to the tail.
    #[test]
    fn columns_sorted_with_removed_at_tail(board in board_strategy()) {
        for c in 0..board.n() {
            let rows = board.column_rows(c);
            for w in rows.windows(2) {
                prop_assert!(w[0] >= w[1], "column {c} not descending: {rows:?}");
            }
            let first_removed = rows.iter().position(|&r| r == -1);
            if let Some(pos) = first_removed {
                prop_assert!(rows[pos..].iter().all(|&r| r == -1));
            }
        }
    }

    // 2. Serialization round-trips through the text format.
    #[test]
    fn text_roundtrip(board in board_strategy()) {
        let reparsed: Board = board.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, board);
    }

    // 3. The chip count always matches the layout.
    #[test]
    fn num_chips_matches_layout(board in board_strategy()) {
        let counted: usize = (0..board.n())
            .map(|c| board.column_rows(c).iter().filter(|&&r| r >= 0).count())
            .sum();
        prop_assert_eq!(board.num_chips(), counted);
    }

    // 4. Applying any pusher move preserves the chip count and flags the
    //    Remover as next to act.
    #[test]
    fn pusher_move_preserves_chips(board in board_strategy(), raw in prop::collection::vec(0usize..9, 1..4)) {
        let mut after = board.clone();
        let chips = board.num_chips();
        let moved = after.apply_pusher(&raw);
        prop_assert_eq!(after.num_chips(), chips);
        if moved {
            prop_assert_eq!(after.turn(), chippush_core::Player::Remover);
        }
    }

    // 5. The order is reflexive.
    #[test]
    fn compare_reflexive(board in board_strategy()) {
        prop_assert_eq!(compare_boards(&board, &board, Purpose::Both), CompResult::Equal);
    }

    // 6. Swapping the operands reverses the verdict.
    #[test]
    fn compare_antisymmetric((a, b) in board_pair_strategy()) {
        let ab = compare_boards(&a, &b, Purpose::Both);
        let ba = compare_boards(&b, &a, Purpose::Both);
        prop_assert_eq!(ab.reversed(), ba);
    }

    // 7. Permuting columns never changes a board's place in the order.
    #[test]
    fn compare_column_permutation_invariant(board in board_strategy()) {
        let mut rows: Vec<Vec<i32>> = (0..board.n()).map(|c| board.column_rows(c)).collect();
        rows.rotate_left(1);
        let rotated = Board::from_rows(board.n(), board.k(), rows);
        prop_assert_eq!(compare_boards(&board, &rotated, Purpose::Both), CompResult::Equal);
    }

    // 8. One-sided purposes agree with Purpose::Both where they apply.
    #[test]
    fn compare_purpose_agreement((a, b) in board_pair_strategy()) {
        let both = compare_boards(&a, &b, Purpose::Both);
        let less = compare_boards(&a, &b, Purpose::Less);
        let greater = compare_boards(&a, &b, Purpose::Greater);

        if both.is_le() {
            prop_assert_eq!(less, CompResult::Less);
        } else {
            prop_assert_eq!(less, CompResult::Incomparable);
        }
        if both.is_ge() {
            prop_assert_eq!(greater, CompResult::Greater);
        } else {
            prop_assert_eq!(greater, CompResult::Incomparable);
        }
    }

    // 9. Transitivity, sampled over triples with shared dimensions.
    #[test]
    fn compare_transitive_sampled(
        (a, b) in board_pair_strategy(),
        extra in prop::collection::vec(prop::collection::vec(-1i32..=4, 3), 3),
    ) {
        let trimmed: Vec<Vec<i32>> = (0..a.n())
            .map(|c| extra[c % 3][..a.k()].to_vec())
            .collect();
        let c = Board::from_rows(a.n(), a.k(), trimmed);

        if compare_boards(&a, &b, Purpose::Both).is_le()
            && compare_boards(&b, &c, Purpose::Both).is_le()
        {
            prop_assert!(compare_boards(&a, &c, Purpose::Both).is_le());
        }
    }
}
