//! Chip-pushing game logic with a column-major board representation.
//!
//! # Board layout
//!
//! ```text
//! A board has N columns of K slots each. A slot holds either a chip,
//! identified by the row it currently occupies (0 or higher), or -1 once
//! the chip has been removed from the game.
//!
//! Every column is kept sorted in descending row order, so slot 0 of a
//! column is its tallest surviving chip and the -1 entries cluster at the
//! tail. Each slot also carries a "moved" flag (set while the Pusher's
//! latest push is awaiting the Remover's reply) and a stable per-column
//! chip ID used by symmetric games.
//! ```
//!
//! # Text encoding
//!
//! ```text
//! n={N},k={K},n_chips={M}
//! r00 r01 ... r0{K-1}
//! ...
//! r{N-1}0 ... r{N-1}{K-1}
//! ```
//!
//! One line per column, each entry the row of a chip or -1. Moved flags
//! and chip IDs are not serialized; archived boards are always snapshots
//! taken on the Pusher's turn.

pub mod compare;
pub mod encoding;
pub mod matching;

use std::fmt;
use std::str::FromStr;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Player {
    /// Advances chips up one row at a time.
    Pusher,
    /// Clears all just-pushed chips from one chosen column.
    Remover,
}

impl Player {
    /// Get the opposing player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Pusher => Player::Remover,
            Player::Remover => Player::Pusher,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Pusher => write!(f, "Pusher"),
            Player::Remover => write!(f, "Remover"),
        }
    }
}

/// A Pusher move: the set of chips to push. In a normal game each entry is
/// a flat slot index `column * K + slot`; in a symmetric game each entry is
/// a chip ID in `0..K`, applied to every column in parallel.
pub type PusherMove = Vec<usize>;

/// A Remover move: the index of the column to clear.
pub type RemoverMove = usize;

/// The rows of one column, sorted descending, `-1` for removed chips.
pub type ColumnState = Vec<i32>;

/// One slot of a column.
#[derive(Clone, Copy, Debug)]
struct Slot {
    /// Row of the chip, or -1 once removed.
    row: i32,
    /// Whether the Pusher advanced this chip in the pending turn.
    moved: bool,
    /// Stable per-column chip ID (symmetric games address chips by it).
    id: u8,
}

/// Column-major board state.
///
/// Boards are plain values: the search copies them when expanding a child
/// and never shares them. All mutation goes through [`Board::apply_pusher`],
/// [`Board::apply_pusher_by_id`] and [`Board::apply_remover`], each of which
/// restores the sorted-descending column invariant before returning.
#[derive(Clone, Debug)]
pub struct Board {
    n: usize,
    k: usize,
    num_chips: usize,
    cols: Vec<Vec<Slot>>,
}

/// Board identity is the layout and the pending-push flags. Chip IDs are
/// deliberately excluded: they only address chips in symmetric games and
/// get permuted by sorting.
impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.n == other.n
            && self.k == other.k
            && self
                .cols
                .iter()
                .zip(&other.cols)
                .all(|(a, b)| {
                    a.iter()
                        .zip(b)
                        .all(|(x, y)| x.row == y.row && x.moved == y.moved)
                })
    }
}

impl Eq for Board {}

/// Error produced when a board string does not match the text encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBoardError {
    message: String,
}

impl ParseBoardError {
    fn new(message: impl Into<String>) -> Self {
        ParseBoardError { message: message.into() }
    }
}

impl fmt::Display for ParseBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid board string: {}", self.message)
    }
}

impl std::error::Error for ParseBoardError {}

impl Board {
    /// Create a board with all `n * k` chips at row 0, none moved.
    pub fn new(n: usize, k: usize) -> Board {
        let cols = (0..n)
            .map(|_| {
                (0..k)
                    .map(|idx| Slot { row: 0, moved: false, id: idx as u8 })
                    .collect()
            })
            .collect();
        Board { n, k, num_chips: n * k, cols }
    }

    /// Create a board from an explicit row layout, one inner vector per
    /// column. Columns are tidied and the chip count recomputed.
    ///
    /// Panics if any column's length differs from `k`.
    pub fn from_rows(n: usize, k: usize, rows: Vec<Vec<i32>>) -> Board {
        assert_eq!(rows.len(), n, "layout must have one entry per column");
        let cols: Vec<Vec<Slot>> = rows
            .into_iter()
            .map(|col| {
                assert_eq!(col.len(), k, "every column must have k slots");
                col.into_iter()
                    .enumerate()
                    .map(|(idx, row)| Slot { row, moved: false, id: idx as u8 })
                    .collect()
            })
            .collect();
        let mut board = Board { n, k, num_chips: 0, cols };
        board.num_chips = board.count_chips();
        board.tidy();
        board
    }

    fn count_chips(&self) -> usize {
        self.cols
            .iter()
            .map(|col| col.iter().filter(|s| s.row >= 0).count())
            .sum()
    }

    /// Number of columns.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of slots per column.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of chips still on the board.
    #[inline]
    pub fn num_chips(&self) -> usize {
        self.num_chips
    }

    /// Row of the chip at `(c, idx)`, or -1 if removed.
    #[inline]
    pub fn chip_row(&self, c: usize, idx: usize) -> i32 {
        self.cols[c][idx].row
    }

    /// Whether the chip at `(c, idx)` was advanced in the pending Pusher turn.
    #[inline]
    pub fn chip_is_moved(&self, c: usize, idx: usize) -> bool {
        self.cols[c][idx].moved
    }

    /// Stable chip ID of the chip at `(c, idx)`.
    #[inline]
    pub fn chip_id(&self, c: usize, idx: usize) -> u8 {
        self.cols[c][idx].id
    }

    /// The rows of column `c`, sorted descending.
    pub fn column_rows(&self, c: usize) -> ColumnState {
        self.cols[c].iter().map(|s| s.row).collect()
    }

    /// The tallest surviving row on the board, or -1 if none.
    pub fn max_row(&self) -> i32 {
        if self.n == 0 || self.k == 0 {
            return -1;
        }
        self.cols.iter().map(|col| col[0].row).max().unwrap_or(-1)
    }

    /// Whose turn the layout implies: the Remover's iff at least one chip
    /// carries the moved flag, the Pusher's otherwise.
    pub fn turn(&self) -> Player {
        let any_moved = self
            .cols
            .iter()
            .any(|col| col.iter().any(|s| s.moved));
        if any_moved {
            Player::Remover
        } else {
            Player::Pusher
        }
    }

    // ========== Move application ==========

    /// Apply a Pusher move given as flat slot indices `c * K + idx`.
    ///
    /// Out-of-range indices and removed chips are skipped. Returns whether
    /// at least one chip was advanced.
    pub fn apply_pusher(&mut self, mv: &PusherMove) -> bool {
        if self.k == 0 {
            return false;
        }
        let mut result = false;
        for &flat in mv {
            let c = flat / self.k;
            let idx = flat % self.k;
            if c >= self.n || idx >= self.k {
                continue;
            }
            if self.cols[c][idx].row == -1 {
                continue;
            }
            self.cols[c][idx].row += 1;
            self.cols[c][idx].moved = true;
            result = true;
        }
        self.tidy();
        result
    }

    /// Apply a symmetric Pusher move given as chip IDs: every column pushes
    /// its chip with each listed ID. Unknown IDs are skipped.
    pub fn apply_pusher_by_id(&mut self, mv: &PusherMove) -> bool {
        let mut should_move = vec![false; self.k];
        for &id in mv {
            if id < self.k {
                should_move[id] = true;
            }
        }

        let mut result = false;
        for col in &mut self.cols {
            for slot in col.iter_mut() {
                if slot.row == -1 {
                    continue;
                }
                if should_move[slot.id as usize] {
                    slot.row += 1;
                    slot.moved = true;
                    result = true;
                }
            }
        }
        self.tidy();
        result
    }

    /// Apply a Remover move: delete every moved chip in column `c`, then
    /// clear all moved flags. Returns whether at least one chip was removed.
    pub fn apply_remover(&mut self, c: RemoverMove) -> bool {
        if c >= self.n {
            return false;
        }

        let mut result = false;
        for slot in &mut self.cols[c] {
            if slot.moved && slot.row != -1 {
                slot.row = -1;
                self.num_chips -= 1;
                result = true;
            }
        }

        for col in &mut self.cols {
            for slot in col.iter_mut() {
                slot.moved = false;
            }
        }

        if result {
            self.tidy_col(c);
        }
        result
    }

    /// Copy of this board with every pending push reverted: moved chips drop
    /// back one row and all moved flags clear. This is the pre-Pusher-move
    /// snapshot the archive indexes.
    pub fn without_moved_chips(&self) -> Board {
        let mut board = self.clone();
        for col in &mut board.cols {
            for slot in col.iter_mut() {
                if slot.moved {
                    slot.row -= 1;
                    slot.moved = false;
                }
            }
        }
        board.tidy();
        board
    }

    // ========== Move enumeration ==========

    /// Every nonempty subset of the surviving chips, as flat indices.
    ///
    /// Exponential in the chip count; the search uses the pruned generator
    /// instead, this exists for exhaustive verification.
    pub fn pusher_moves(&self) -> Vec<PusherMove> {
        let mut movable = Vec::new();
        for c in 0..self.n {
            for idx in 0..self.k {
                if self.cols[c][idx].row != -1 {
                    movable.push(c * self.k + idx);
                }
            }
        }

        let count = 1usize << movable.len();
        let mut moves = Vec::with_capacity(count.saturating_sub(1));
        for subset in 1..count {
            let mv: PusherMove = movable
                .iter()
                .enumerate()
                .filter(|(bit, _)| subset & (1 << bit) != 0)
                .map(|(_, &flat)| flat)
                .collect();
            moves.push(mv);
        }
        moves
    }

    /// The columns holding at least one moved chip, sorted by decreasing
    /// moved-chip count (a search-order heuristic).
    pub fn remover_moves(&self) -> Vec<RemoverMove> {
        let mut moves: Vec<(usize, usize)> = (0..self.n)
            .filter_map(|c| {
                let moved = self.cols[c].iter().filter(|s| s.moved).count();
                (moved > 0).then_some((c, moved))
            })
            .collect();
        moves.sort_by(|a, b| b.1.cmp(&a.1));
        moves.into_iter().map(|(c, _)| c).collect()
    }

    // ========== Tidy ==========

    fn tidy(&mut self) {
        for c in 0..self.n {
            self.tidy_col(c);
        }
    }

    /// Re-sort column `c` descending by row; moved chips sort before
    /// unmoved chips on the same row so the layout stays deterministic.
    fn tidy_col(&mut self, c: usize) {
        self.cols[c].sort_by(|a, b| b.row.cmp(&a.row).then(b.moved.cmp(&a.moved)));
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "n={},k={},n_chips={}", self.n, self.k, self.num_chips)?;
        for col in &self.cols {
            for (idx, slot) in col.iter().enumerate() {
                if idx > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", slot.row)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Board, ParseBoardError> {
        let mut lines = s.lines();
        let header = lines.next().ok_or_else(|| ParseBoardError::new("empty input"))?;

        let (n, k) = parse_header(header)?;

        let mut rows = Vec::with_capacity(n * k);
        for line in lines {
            for token in line.split_whitespace() {
                let row: i32 = token
                    .parse()
                    .map_err(|_| ParseBoardError::new(format!("bad integer {token:?}")))?;
                rows.push(row);
            }
        }
        if rows.len() != n * k {
            return Err(ParseBoardError::new(format!(
                "expected {} entries, found {}",
                n * k,
                rows.len()
            )));
        }

        let layout: Vec<Vec<i32>> = rows.chunks(k.max(1)).map(|chunk| chunk.to_vec()).collect();
        if k == 0 {
            return Ok(Board::from_rows(n, 0, vec![Vec::new(); n]));
        }
        Ok(Board::from_rows(n, k, layout))
    }
}

/// Parse the `n={N},k={K},n_chips={M}` header line. The chip count is
/// recomputed from the entries, so only `n` and `k` are consumed.
fn parse_header(line: &str) -> Result<(usize, usize), ParseBoardError> {
    let mut n = None;
    let mut k = None;
    for field in line.trim().split(',') {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| ParseBoardError::new(format!("bad header field {field:?}")))?;
        let value: usize = value
            .parse()
            .map_err(|_| ParseBoardError::new(format!("bad header value {value:?}")))?;
        match key {
            "n" => n = Some(value),
            "k" => k = Some(value),
            "n_chips" => {}
            _ => return Err(ParseBoardError::new(format!("unknown header key {key:?}"))),
        }
    }
    match (n, k) {
        (Some(n), Some(k)) => Ok((n, k)),
        _ => Err(ParseBoardError::new("header must contain n= and k=")),
    }
}

/// A board together with the game parameters needed to judge it: the goal
/// row, the symmetric flag, the running score and whose turn it is.
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    goal: i32,
    symmetric: bool,
    score: i32,
    player: Option<Player>,
}

impl GameState {
    /// Wrap a board for a normal (non-symmetric) game toward `goal`.
    pub fn new(board: Board, goal: i32) -> GameState {
        GameState::with_symmetric(board, goal, false)
    }

    /// Wrap a board, choosing symmetric or normal move semantics.
    pub fn with_symmetric(board: Board, goal: i32, symmetric: bool) -> GameState {
        let score = board.max_row().max(0);
        let mut state = GameState { board, goal, symmetric, score, player: None };
        state.player = if state.winner().is_some() {
            None
        } else {
            Some(state.board.turn())
        };
        state
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn goal(&self) -> i32 {
        self.goal
    }

    #[inline]
    pub fn symmetric(&self) -> bool {
        self.symmetric
    }

    #[inline]
    pub fn score(&self) -> i32 {
        self.score
    }

    /// The player to move, or `None` once the game is over.
    #[inline]
    pub fn current_player(&self) -> Option<Player> {
        self.player
    }

    /// The winner as of right now, not a prediction. The Pusher has won
    /// once the score reaches the goal; the Remover once no chips survive.
    pub fn winner(&self) -> Option<Player> {
        if self.score >= self.goal {
            Some(Player::Pusher)
        } else if self.board.num_chips() == 0 {
            Some(Player::Remover)
        } else {
            None
        }
    }

    /// The pre-Pusher-move snapshot of the board, the form archives index.
    pub fn board_without_moved_chips(&self) -> Board {
        self.board.without_moved_chips()
    }

    /// Apply a Pusher move. Returns false (and leaves the turn unchanged)
    /// when it is not the Pusher's move.
    pub fn apply_pusher(&mut self, mv: &PusherMove) -> bool {
        if self.player != Some(Player::Pusher) {
            return false;
        }
        let result = if self.symmetric {
            self.board.apply_pusher_by_id(mv)
        } else {
            self.board.apply_pusher(mv)
        };
        self.player = Some(Player::Remover);
        if self.winner().is_some() {
            self.player = None;
        }
        result
    }

    /// Apply a Remover move and refresh the score from the surviving chips.
    pub fn apply_remover(&mut self, mv: RemoverMove) -> bool {
        if self.player != Some(Player::Remover) {
            return false;
        }
        let result = self.board.apply_remover(mv);
        self.score = self.score.max(self.board.max_row().max(0));
        self.player = Some(Player::Pusher);
        if self.winner().is_some() {
            self.player = None;
        }
        result
    }

    /// Every successor state under the full (unpruned) move list of the
    /// current player. Empty once the game is over.
    pub fn step(&self) -> Vec<GameState> {
        match self.player {
            Some(Player::Pusher) => {
                let moves = if self.symmetric {
                    symmetric_id_moves(self.board.k())
                } else {
                    self.board.pusher_moves()
                };
                moves
                    .iter()
                    .map(|mv| {
                        let mut next = self.clone();
                        next.apply_pusher(mv);
                        next
                    })
                    .collect()
            }
            Some(Player::Remover) => self
                .board
                .remover_moves()
                .into_iter()
                .map(|mv| {
                    let mut next = self.clone();
                    next.apply_remover(mv);
                    next
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

/// All nonempty chip-ID subsets for a symmetric game with `k` IDs.
fn symmetric_id_moves(k: usize) -> Vec<PusherMove> {
    let count = 1usize << k;
    (1..count)
        .map(|mask| (0..k).filter(|&id| mask & (1 << id) != 0).collect())
        .collect()
}
