//! The dominance-indexed archive of proven winning and losing boards.
//!
//! Every board the archive holds is a Pusher-to-move snapshot with a
//! settled verdict. Dominance makes each entry worth far more than itself:
//! a board that dominates a winning board wins, a board dominated by a
//! losing board loses. Entries are bucketed by chip count so a query can
//! skip buckets that could never dominate (a board cannot be below one
//! with fewer chips, nor above one with more).
//!
//! The two sides are kept as antichains: inserting a board evicts the
//! entries it makes redundant and is itself dropped when redundant.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use rayon::prelude::*;

use chippush_core::compare::{compare_boards, CompResult, Purpose};
use chippush_core::{Board, GameState, Player};

/// Separates boards in an archive file.
const BOARD_DELIMITER: &str = "---";

/// Dominance-indexed store of settled boards, one bucket per chip count.
#[derive(Debug, Default)]
pub struct Archive {
    winning: BTreeMap<usize, Vec<Board>>,
    losing: BTreeMap<usize, Vec<Board>>,
}

impl Archive {
    pub fn new() -> Archive {
        Archive::default()
    }

    /// Total number of archived winning boards.
    pub fn winning_count(&self) -> usize {
        self.winning.values().map(Vec::len).sum()
    }

    /// Total number of archived losing boards.
    pub fn losing_count(&self) -> usize {
        self.losing.values().map(Vec::len).sum()
    }

    /// All winning boards, flattened in ascending chip count.
    pub fn winning_boards(&self) -> impl Iterator<Item = &Board> {
        self.winning.values().flatten()
    }

    /// All losing boards, flattened in ascending chip count.
    pub fn losing_boards(&self) -> impl Iterator<Item = &Board> {
        self.losing.values().flatten()
    }

    // ========== Insertion ==========

    /// Record a winning board, keeping the bucket an antichain: the insert
    /// is dropped when an archived board already implies it, and evicts
    /// archived boards it implies.
    pub fn add_winning(&mut self, board: Board) {
        let bucket = self.winning.entry(board.num_chips()).or_default();
        let mut keep = true;
        bucket.retain(|existing| match compare_boards(&board, existing, Purpose::Both) {
            // An existing entry at or below the newcomer subsumes it.
            CompResult::Greater | CompResult::Equal => {
                keep = false;
                true
            }
            // The newcomer is below an existing entry: that entry is now
            // redundant.
            CompResult::Less => false,
            CompResult::Incomparable => true,
        });
        if keep {
            bucket.push(board);
        }
    }

    /// Record a losing board; the mirror image of [`Archive::add_winning`].
    pub fn add_losing(&mut self, board: Board) {
        let bucket = self.losing.entry(board.num_chips()).or_default();
        let mut keep = true;
        bucket.retain(|existing| match compare_boards(&board, existing, Purpose::Both) {
            CompResult::Less | CompResult::Equal => {
                keep = false;
                true
            }
            CompResult::Greater => false,
            CompResult::Incomparable => true,
        });
        if keep {
            bucket.push(board);
        }
    }

    // ========== Prediction ==========

    /// Predict the winner of `state` from the archive, or `None` when the
    /// archive has nothing to say. A finished game reports its true
    /// winner. Bucket scans run on the rayon pool and stop at the first
    /// positive match.
    pub fn predict_winner(&self, state: &GameState) -> Option<Player> {
        if let Some(winner) = state.winner() {
            return Some(winner);
        }

        // The archive indexes pre-Pusher-move snapshots.
        let board = state.board_without_moved_chips();
        let n = board.num_chips();

        for (&chips, bucket) in self.winning.range(..=n) {
            let hit = bucket.par_iter().find_any(|&winning| {
                if chips == n {
                    compare_boards(&board, winning, Purpose::Both).is_ge()
                } else {
                    compare_boards(&board, winning, Purpose::Greater) == CompResult::Greater
                }
            });
            if hit.is_some() {
                return Some(Player::Pusher);
            }
        }

        for (&chips, bucket) in self.losing.range(n..) {
            let hit = bucket.par_iter().find_any(|&losing| {
                if chips == n {
                    compare_boards(&board, losing, Purpose::Both).is_le()
                } else {
                    compare_boards(&board, losing, Purpose::Less) == CompResult::Less
                }
            });
            if hit.is_some() {
                return Some(Player::Remover);
            }
        }

        None
    }

    // ========== Batch pruning ==========

    /// Restore both antichain invariants, comparing across buckets.
    /// Insertion already keeps each bucket tidy; this pass catches
    /// cross-bucket redundancy, mostly from freshly loaded files.
    pub fn prune(&mut self) {
        self.winning = prune_side(std::mem::take(&mut self.winning), |a, b| {
            match compare_boards(a, b, Purpose::Both) {
                // A winning board above another is redundant.
                CompResult::Greater => Pruned::First,
                CompResult::Less | CompResult::Equal => Pruned::Second,
                CompResult::Incomparable => Pruned::Neither,
            }
        });
        self.losing = prune_side(std::mem::take(&mut self.losing), |a, b| {
            match compare_boards(a, b, Purpose::Both) {
                CompResult::Less => Pruned::First,
                CompResult::Greater | CompResult::Equal => Pruned::Second,
                CompResult::Incomparable => Pruned::Neither,
            }
        });
    }

    // ========== File I/O ==========

    /// Write the winning boards to `path`, creating parent directories.
    pub fn save_winning(&self, path: &Path) -> io::Result<usize> {
        save_side(&self.winning, path)
    }

    /// Write the losing boards to `path`, creating parent directories.
    pub fn save_losing(&self, path: &Path) -> io::Result<usize> {
        save_side(&self.losing, path)
    }

    /// Load winning boards from `path`. A missing file loads nothing;
    /// boards parsed before a malformed block are kept.
    pub fn load_winning(&mut self, path: &Path) -> io::Result<usize> {
        let boards = load_boards(path)?;
        let count = boards.len();
        for board in boards {
            self.winning.entry(board.num_chips()).or_default().push(board);
        }
        Ok(count)
    }

    /// Load losing boards from `path`; see [`Archive::load_winning`].
    pub fn load_losing(&mut self, path: &Path) -> io::Result<usize> {
        let boards = load_boards(path)?;
        let count = boards.len();
        for board in boards {
            self.losing.entry(board.num_chips()).or_default().push(board);
        }
        Ok(count)
    }
}

enum Pruned {
    First,
    Second,
    Neither,
}

/// Quadratic redundancy sweep over one side, rebucketed afterwards.
fn prune_side(
    side: BTreeMap<usize, Vec<Board>>,
    verdict: impl Fn(&Board, &Board) -> Pruned,
) -> BTreeMap<usize, Vec<Board>> {
    let boards: Vec<Board> = side.into_values().flatten().collect();
    let mut removed = vec![false; boards.len()];

    for i in 0..boards.len() {
        if removed[i] {
            continue;
        }
        for j in i + 1..boards.len() {
            if removed[j] {
                continue;
            }
            match verdict(&boards[i], &boards[j]) {
                Pruned::First => {
                    removed[i] = true;
                    break;
                }
                Pruned::Second => removed[j] = true,
                Pruned::Neither => {}
            }
        }
    }

    let mut rebuilt: BTreeMap<usize, Vec<Board>> = BTreeMap::new();
    for (board, gone) in boards.into_iter().zip(removed) {
        if !gone {
            rebuilt.entry(board.num_chips()).or_default().push(board);
        }
    }
    rebuilt
}

fn save_side(side: &BTreeMap<usize, Vec<Board>>, path: &Path) -> io::Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let mut count = 0;
    for board in side.values().flatten() {
        write!(writer, "{board}")?;
        writeln!(writer, "{BOARD_DELIMITER}")?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

fn load_boards(path: &Path) -> io::Result<Vec<Board>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;

    let mut boards = Vec::new();
    for block in text.split(BOARD_DELIMITER) {
        if block.trim().is_empty() {
            continue;
        }
        let board: Board = block.trim_start_matches('\n').parse().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("{}: {e}", path.display()))
        })?;
        boards.push(board);
    }
    Ok(boards)
}
