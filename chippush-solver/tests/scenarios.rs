//! End-to-end runs: configuration → starting position → search → archive.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chippush_core::Player;
use chippush_solver::archive::Archive;
use chippush_solver::config::{self, Config};
use chippush_solver::solver::{minimax, SearchOptions};
use chippush_solver::stats::SolverStats;

fn run(config_text: &str, archive: &mut Archive) -> Option<Player> {
    let config: Config = serde_json::from_str(config_text).unwrap();
    let state = config.common.initial_state();
    let options = SearchOptions {
        log_interval_secs: 0,
        running: Arc::new(AtomicBool::new(true)),
        ..SearchOptions::default()
    };
    minimax(&state, archive, &options, &mut SolverStats::new())
}

#[test]
fn two_columns_of_two_drain_before_the_goal() {
    // The Remover can always clear whichever column threatens row 2 and
    // still shrink the board every round.
    let mut archive = Archive::new();
    let winner = run(
        r#"{ "common": { "k-and-n": [[2, 2]], "goal": 2 } }"#,
        &mut archive,
    );
    assert_eq!(winner, Some(Player::Remover));
}

#[test]
fn two_lone_chips_never_survive_at_the_goal() {
    let mut archive = Archive::new();
    let winner = run(
        r#"{ "common": { "k-and-n": [[1, 2]], "goal": 2 } }"#,
        &mut archive,
    );
    assert_eq!(winner, Some(Player::Remover));
}

#[test]
fn three_columns_of_three_reach_row_two() {
    let mut archive = Archive::new();
    let winner = run(
        r#"{ "common": { "k-and-n": [[3, 3]], "goal": 2 } }"#,
        &mut archive,
    );
    assert_eq!(winner, Some(Player::Pusher));
    assert!(archive.winning_count() > 0);
}

#[test]
fn archives_survive_a_round_trip_and_settle_the_rerun() {
    let mut archive = Archive::new();
    let first = run(
        r#"{ "common": { "k-and-n": [[3, 3]], "goal": 2 } }"#,
        &mut archive,
    );
    archive.prune();

    let dir = std::env::temp_dir().join("chippush-scenario-roundtrip");
    let winning = dir.join(config::archive_file_name(3, 3, 2, false, ""));
    let losing = dir.join("losing").join(config::archive_file_name(3, 3, 2, false, ""));
    archive.save_winning(&winning).unwrap();
    archive.save_losing(&losing).unwrap();

    let mut reloaded = Archive::new();
    reloaded.load_winning(&winning).unwrap();
    reloaded.load_losing(&losing).unwrap();
    reloaded.prune();

    let second = run(
        r#"{ "common": { "k-and-n": [[3, 3]], "goal": 2 } }"#,
        &mut reloaded,
    );
    assert_eq!(first, second);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn mixed_column_heights_build_the_expected_start() {
    let config: Config = serde_json::from_str(
        r#"{ "common": { "k-and-n": [[3, 1], [1, 2]], "goal": 4 } }"#,
    )
    .unwrap();
    let state = config.common.initial_state();
    assert_eq!(state.board().n(), 3);
    assert_eq!(state.board().k(), 3);
    assert_eq!(state.board().num_chips(), 5);
    assert_eq!(state.current_player(), Some(Player::Pusher));
}

#[test]
fn symmetric_flag_threads_through_to_the_search() {
    // A symmetric game restricts the Pusher to ID sets, which can only
    // help the Remover; the all-zero 2x2 game stays a Remover win.
    let mut archive = Archive::new();
    let winner = run(
        r#"{ "common": { "k-and-n": [[2, 2]], "goal": 2, "symmetric": true } }"#,
        &mut archive,
    );
    assert_eq!(winner, Some(Player::Remover));
}
