//! One-ply re-verification of archived verdicts.
//!
//! `verify <config.json>` reloads the archives and checks each entry
//! against the game rules directly: a winning board must have a push after
//! which every Remover reply is a won game or dominates an already-checked
//! winning board; a losing board must answer every push with a reply that
//! is a lost game or is dominated by a losing board. Failures are
//! reported, not fatal: an unconfirmed board means the archive (or the
//! solver that built it) deserves a closer look.

use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use chippush_core::compare::{compare_boards, CompResult, Purpose};
use chippush_core::{Board, GameState, Player};
use chippush_solver::archive::Archive;
use chippush_solver::config::{self, Config};
use chippush_solver::movegen;

fn main() -> ExitCode {
    let Some(config_path) = env::args().nth(1) else {
        eprintln!("Usage: verify <config.json>");
        return ExitCode::FAILURE;
    };

    let config = match Config::load(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.verify.threads)
        .build_global()
        .ok();

    let state = config.common.initial_state();
    let (winning_path, losing_path) = config::default_archive_paths(&config.common);

    let mut archive = Archive::new();
    for path in std::iter::once(&winning_path).chain(&config.minimax.files_to_load_from.winning) {
        match archive.load_winning(path) {
            Ok(0) => {}
            Ok(count) => println!("Loaded {count} winning boards from {}", path.display()),
            Err(e) => eprintln!("Skipping winning archive {}: {e}", path.display()),
        }
    }
    for path in std::iter::once(&losing_path).chain(&config.minimax.files_to_load_from.losing) {
        match archive.load_losing(path) {
            Ok(0) => {}
            Ok(count) => println!("Loaded {count} losing boards from {}", path.display()),
            Err(e) => eprintln!("Skipping losing archive {}: {e}", path.display()),
        }
    }

    let goal = config.common.goal;
    let symmetric = config.common.symmetric;
    let mut winning: Vec<Board> = archive.winning_boards().cloned().collect();
    winning.sort_by_key(Board::num_chips);
    let mut losing: Vec<Board> = archive.losing_boards().cloned().collect();
    losing.sort_by_key(|b| std::cmp::Reverse(b.num_chips()));

    match archive.predict_winner(&state) {
        Some(Player::Pusher) => {
            println!("Starting board predicted winning for the Pusher.");
            let unconfirmed = verify_winning(&winning, goal, symmetric, config.verify.log_frequency.winning);
            report("winning", unconfirmed, winning.len());
        }
        Some(Player::Remover) => {
            println!("Starting board predicted winning for the Remover.");
            let unconfirmed = verify_losing(&losing, goal, symmetric, config.verify.log_frequency.losing);
            report("losing", unconfirmed, losing.len());
        }
        None => {
            println!("No prediction for the starting board; checking both archives.");
            let unconfirmed_winning =
                verify_winning(&winning, goal, symmetric, config.verify.log_frequency.winning);
            let unconfirmed_losing =
                verify_losing(&losing, goal, symmetric, config.verify.log_frequency.losing);
            report("winning", unconfirmed_winning, winning.len());
            report("losing", unconfirmed_losing, losing.len());
        }
    }

    ExitCode::SUCCESS
}

fn report(side: &str, unconfirmed: usize, total: usize) {
    if unconfirmed == 0 {
        println!("All {total} {side} boards confirmed.");
    } else {
        println!("{unconfirmed} of {total} {side} boards NOT confirmed.");
    }
}

/// Check winning boards in ascending chip order, so each board may lean on
/// the boards confirmed before it.
fn verify_winning(winning: &[Board], goal: i32, symmetric: bool, log_frequency: usize) -> usize {
    let total = winning.len();
    let mut unconfirmed = 0;

    for (i, board) in winning.iter().enumerate() {
        if log_frequency > 0 && ((i + 1) % log_frequency == 0 || i + 1 == total) {
            println!("[Verify winning] {} / {total}", i + 1);
        }

        let state = GameState::with_symmetric(board.clone(), goal, symmetric);
        let confirmed = state.winner() == Some(Player::Pusher)
            || state.step().iter().any(|pushed| {
                movegen::pruned_remover_moves(pushed).into_iter().all(|reply| {
                    let mut next = pushed.clone();
                    next.apply_remover(reply);
                    next.winner() == Some(Player::Pusher)
                        || dominates_some(next.board(), &winning[..i])
                })
            });

        if !confirmed {
            unconfirmed += 1;
            println!("Winning board not confirmed:\n{board}");
        }
    }
    unconfirmed
}

/// Check losing boards in parallel; each may lean on the whole losing set.
fn verify_losing(losing: &[Board], goal: i32, symmetric: bool, log_frequency: usize) -> usize {
    let total = losing.len();
    let processed = AtomicUsize::new(0);

    losing
        .par_iter()
        .filter(|board| {
            let state = GameState::with_symmetric((*board).clone(), goal, symmetric);
            let confirmed = state.winner() == Some(Player::Remover)
                || state.step().iter().all(|pushed| {
                    movegen::pruned_remover_moves(pushed).into_iter().any(|reply| {
                        let mut next = pushed.clone();
                        next.apply_remover(reply);
                        next.winner() == Some(Player::Remover)
                            || dominated_by_some(next.board(), losing)
                    })
                });

            let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
            if log_frequency > 0 && (done % log_frequency == 0 || done == total) {
                println!("[Verify losing] {done} / {total}");
            }
            if !confirmed {
                println!("Losing board not confirmed:\n{board}");
            }
            !confirmed
        })
        .count()
}

fn dominates_some(board: &Board, winning: &[Board]) -> bool {
    winning.iter().any(|w| {
        if w.num_chips() == board.num_chips() {
            compare_boards(board, w, Purpose::Both).is_ge()
        } else {
            compare_boards(board, w, Purpose::Greater) == CompResult::Greater
        }
    })
}

fn dominated_by_some(board: &Board, losing: &[Board]) -> bool {
    losing.iter().any(|l| {
        if l.num_chips() == board.num_chips() {
            compare_boards(board, l, Purpose::Both).is_le()
        } else {
            compare_boards(board, l, Purpose::Less) == CompResult::Less
        }
    })
}
