//! Iterative minimax over the pruned game tree.
//!
//! The search is a DFS over explicit frames in a `Vec`; parents are frame
//! indices, never references, and a parent always sits below its children
//! on the stack. Each frame resolves in one of three ways: the archive
//! predicts it, a child promotes it, or its children run out and the
//! default verdict (the mover loses) stands. Freshly computed verdicts of
//! Pusher-to-move frames feed the archive, which is what turns a single
//! run into an endgame tablebase for every later run.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use chippush_core::{GameState, Player};

use crate::archive::Archive;
use crate::movegen;
use crate::stats::SolverStats;

/// Knobs for a solver run.
pub struct SearchOptions {
    /// Interval between temporary archive snapshots, in hours; 0 disables.
    pub hours_per_save: f64,
    /// Where snapshots go: `(winning, losing)` paths for a given suffix.
    pub snapshot_paths: Option<Box<dyn Fn(&str) -> (PathBuf, PathBuf)>>,
    /// Seconds between progress lines.
    pub log_interval_secs: u64,
    /// Cleared externally (e.g. by SIGINT) to stop the search.
    pub running: Arc<AtomicBool>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            hours_per_save: 0.0,
            snapshot_paths: None,
            log_interval_secs: 30,
            running: Arc::new(AtomicBool::new(true)),
        }
    }
}

struct Frame {
    state: GameState,
    /// Index of the parent frame; the frame vector only ever pops from the
    /// top, so the index stays valid for this frame's whole life.
    parent: Option<usize>,
    winner: Option<Player>,
    /// Set when the verdict came from the archive (or a terminal state):
    /// re-recording it would only duplicate knowledge.
    from_archive: bool,
}

/// Decide the winner of `initial` under optimal play.
///
/// Verdicts of expanded Pusher frames are recorded into `archive` as the
/// search unwinds. Returns `None` only when interrupted via
/// [`SearchOptions::running`].
pub fn minimax(
    initial: &GameState,
    archive: &mut Archive,
    options: &SearchOptions,
    stats: &mut SolverStats,
) -> Option<Player> {
    let mut frames = vec![Frame {
        state: initial.clone(),
        parent: None,
        winner: None,
        from_archive: false,
    }];
    let mut result = None;
    let mut last_save = Instant::now();

    while !frames.is_empty() {
        if !options.running.load(Ordering::SeqCst) {
            return None;
        }

        maybe_snapshot(archive, options, &mut last_save);
        if options.log_interval_secs > 0 && stats.should_log(options.log_interval_secs) {
            stats.log_progress(archive.winning_count(), archive.losing_count(), frames.len());
        }

        let top = frames.len() - 1;

        // 1. A settled frame propagates its verdict and pops.
        if let Some(winner) = frames[top].winner {
            let frame = frames.pop().unwrap();
            stats.frames_visited += 1;

            if frame.state.current_player() == Some(Player::Pusher) && !frame.from_archive {
                if winner == Player::Pusher {
                    archive.add_winning(frame.state.board().clone());
                } else {
                    archive.add_losing(frame.state.board().clone());
                }
            }

            match frame.parent {
                None => result = Some(winner),
                Some(parent) => {
                    // The parent only improves on its default verdict when
                    // this child hands the parent's own player the win.
                    if frames[parent].state.current_player() == Some(winner) {
                        frames[parent].winner = Some(winner);
                    }
                }
            }
            continue;
        }

        // 2. A sibling of a move that already won is irrelevant.
        if let Some(parent) = frames[top].parent {
            if frames[parent].winner.is_some()
                && frames[parent].winner == frames[parent].state.current_player()
            {
                frames.pop();
                stats.siblings_skipped += 1;
                continue;
            }
        }

        // 3. Ask the archive before paying for an expansion.
        if let Some(predicted) = archive.predict_winner(&frames[top].state) {
            frames[top].winner = Some(predicted);
            frames[top].from_archive = true;
            stats.record_prediction(predicted);
            continue;
        }

        // 4. Expand. Children go on in reverse so the first-enumerated
        // move is explored first; until one of them wins, the mover is
        // assumed to lose.
        let children = movegen::step_pruned(&frames[top].state);
        let mover = frames[top].state.current_player().expect("unsettled frame is live");
        frames[top].winner = Some(mover.opponent());
        stats.frames_expanded += 1;

        for child in children.into_iter().rev() {
            frames.push(Frame { state: child, parent: Some(top), winner: None, from_archive: false });
        }
        stats.max_stack = stats.max_stack.max(frames.len());
    }

    result
}

fn maybe_snapshot(archive: &Archive, options: &SearchOptions, last_save: &mut Instant) {
    if options.hours_per_save <= 0.0 {
        return;
    }
    let Some(paths) = &options.snapshot_paths else {
        return;
    };
    if last_save.elapsed().as_secs_f64() < options.hours_per_save * 3600.0 {
        return;
    }

    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default();
    let (winning, losing) = paths(&suffix);
    if let Err(e) = archive.save_winning(&winning) {
        eprintln!("Failed to snapshot winning archive: {e}");
    }
    if let Err(e) = archive.save_losing(&losing) {
        eprintln!("Failed to snapshot losing archive: {e}");
    }
    *last_save = Instant::now();
}
