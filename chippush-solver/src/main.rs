//! Chip-pushing solver entry point.
//!
//! `chippush-solver <config.json>` decides the winner of the configured
//! game, warm-starting from (and afterwards persisting) the winning and
//! losing archives.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chippush_solver::archive::Archive;
use chippush_solver::config::{self, Config};
use chippush_solver::solver::{minimax, SearchOptions};
use chippush_solver::stats::SolverStats;

fn main() -> ExitCode {
    let Some(config_path) = env::args().nth(1) else {
        eprintln!("Usage: chippush-solver <config.json>");
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
        .num_threads(config.minimax.threads)
        .build_global()
        .ok(); // May already be initialized.

    let state = config.common.initial_state();
    println!("Chip-Pushing Solver");
    println!("===================");
    println!(
        "N={} K={} goal={} symmetric={} threads={}",
        state.board().n(),
        state.board().k(),
        state.goal(),
        state.symmetric(),
        config.minimax.threads,
    );
    println!();
    println!("Starting board:");
    print!("{}", state.board());
    println!();

    // SIGINT stops the search between frames; the archives still get saved.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, finishing up...");
        r.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Cannot install interrupt handler: {e}");
    }

    let (winning_path, losing_path) = config::default_archive_paths(&config.common);
    let mut archive = Archive::new();
    load_archives(&mut archive, &config, &winning_path, &losing_path);
    if archive.winning_count() + archive.losing_count() > 0 {
        archive.prune();
        println!(
            "Archive after load: {} winning, {} losing",
            archive.winning_count(),
            archive.losing_count()
        );
    }

    let snapshot_common = config.common.clone();
    let options = SearchOptions {
        hours_per_save: config.minimax.hours_per_save,
        snapshot_paths: Some(Box::new(move |suffix| {
            config::temp_archive_paths(&snapshot_common, suffix)
        })),
        log_interval_secs: 30,
        running: running.clone(),
    };

    let mut stats = SolverStats::new();
    let start = Instant::now();
    let outcome = minimax(&state, &mut archive, &options, &mut stats);
    let elapsed = start.elapsed();

    println!();
    match outcome {
        Some(winner) => println!("{winner} wins with optimal play."),
        None => println!("Search interrupted before completion."),
    }
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!();
    stats.print_summary();

    archive.prune();
    println!();
    println!(
        "Saving archives: {} winning, {} losing",
        archive.winning_count(),
        archive.losing_count()
    );
    if let Err(e) = archive.save_winning(&winning_path) {
        eprintln!("Failed to save {}: {e}", winning_path.display());
        return ExitCode::FAILURE;
    }
    if let Err(e) = archive.save_losing(&losing_path) {
        eprintln!("Failed to save {}: {e}", losing_path.display());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Best-effort loading: the default files plus any configured extras. A
/// missing or broken file costs a warning, never the run.
fn load_archives(archive: &mut Archive, config: &Config, winning: &PathBuf, losing: &PathBuf) {
    let mut winning_files = vec![winning.clone()];
    winning_files.extend(config.minimax.files_to_load_from.winning.iter().cloned());
    let mut losing_files = vec![losing.clone()];
    losing_files.extend(config.minimax.files_to_load_from.losing.iter().cloned());

    for path in &winning_files {
        match archive.load_winning(path) {
            Ok(0) => {}
            Ok(count) => println!("Loaded {count} winning boards from {}", path.display()),
            Err(e) => eprintln!("Skipping winning archive {}: {e}", path.display()),
        }
    }
    for path in &losing_files {
        match archive.load_losing(path) {
            Ok(0) => {}
            Ok(count) => println!("Loaded {count} losing boards from {}", path.display()),
            Err(e) => eprintln!("Skipping losing archive {}: {e}", path.display()),
        }
    }
}
