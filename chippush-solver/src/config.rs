//! JSON configuration, the starting position it describes, and the archive
//! file naming scheme.
//!
//! ```json
//! {
//!   "common":  { "k-and-n": [[3, 2], [2, 1]], "goal": 4, "symmetric": false },
//!   "minimax": { "files-to-load-from": { "winning": [], "losing": [] },
//!                "hours-per-save": 1.0, "threads": 8 },
//!   "verify":  { "threads": 8, "log-frequency": { "winning": 10, "losing": 50 } }
//! }
//! ```
//!
//! Unknown keys are ignored; missing sections fall back to defaults, but a
//! missing `common` section is a startup error.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use chippush_core::{Board, GameState};

/// Top-level configuration consumed by both binaries.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub common: CommonConfig,
    #[serde(default)]
    pub minimax: MinimaxConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
}

/// The game being solved.
#[derive(Debug, Clone, Deserialize)]
pub struct CommonConfig {
    /// Column groups as `[k, n]` pairs: `n` columns of `k` chips each.
    #[serde(rename = "k-and-n")]
    pub k_and_n: Vec<(usize, usize)>,
    /// Row the Pusher must reach.
    pub goal: i32,
    /// Whether Pusher moves address chips by per-column ID.
    #[serde(default)]
    pub symmetric: bool,
}

/// Solver-run settings.
#[derive(Debug, Deserialize)]
pub struct MinimaxConfig {
    #[serde(rename = "files-to-load-from", default)]
    pub files_to_load_from: LoadFiles,
    /// Interval between temporary archive snapshots; 0 disables them.
    #[serde(rename = "hours-per-save", default)]
    pub hours_per_save: f64,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

/// Extra archive files to preload, beyond the default paths.
#[derive(Debug, Deserialize, Default)]
pub struct LoadFiles {
    #[serde(default)]
    pub winning: Vec<PathBuf>,
    #[serde(default)]
    pub losing: Vec<PathBuf>,
}

/// Verifier settings.
#[derive(Debug, Deserialize)]
pub struct VerifyConfig {
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(rename = "log-frequency", default)]
    pub log_frequency: LogFrequency,
}

/// How often the verifier reports progress, in boards per side.
#[derive(Debug, Deserialize)]
pub struct LogFrequency {
    #[serde(default = "default_winning_log")]
    pub winning: usize,
    #[serde(default = "default_losing_log")]
    pub losing: usize,
}

fn default_threads() -> usize {
    8
}

fn default_winning_log() -> usize {
    10
}

fn default_losing_log() -> usize {
    50
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        MinimaxConfig {
            files_to_load_from: LoadFiles::default(),
            hours_per_save: 0.0,
            threads: default_threads(),
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        VerifyConfig { threads: default_threads(), log_frequency: LogFrequency::default() }
    }
}

impl Default for LogFrequency {
    fn default() -> Self {
        LogFrequency { winning: default_winning_log(), losing: default_losing_log() }
    }
}

/// Error loading or interpreting a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {e}"),
            ConfigError::Parse(e) => write!(f, "cannot parse config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl Config {
    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}

impl CommonConfig {
    /// Total number of columns in the starting position.
    pub fn n(&self) -> usize {
        self.k_and_n.iter().map(|&(_, n)| n).sum()
    }

    /// Slots per column in the starting position.
    pub fn k(&self) -> usize {
        self.k_and_n.iter().map(|&(k, _)| k).max().unwrap_or(0)
    }

    /// Build the starting board: for each `[k_i, n_i]` pair, `n_i` columns
    /// whose first `k_i` slots hold chips at row 0 and whose remaining
    /// slots are already removed. Groups are laid out tallest-first.
    pub fn initial_board(&self) -> Board {
        let n = self.n();
        let k = self.k();

        let mut groups = self.k_and_n.clone();
        groups.sort_by(|a, b| b.0.cmp(&a.0));

        let mut rows = Vec::with_capacity(n);
        for (chips, count) in groups {
            for _ in 0..count {
                let mut col = vec![0; chips];
                col.resize(k, -1);
                rows.push(col);
            }
        }
        Board::from_rows(n, k, rows)
    }

    /// The starting game state.
    pub fn initial_state(&self) -> GameState {
        GameState::with_symmetric(self.initial_board(), self.goal, self.symmetric)
    }
}

/// File name for an archive side:
/// `N{N}_K{K}_goal{GOAL}[_sym]_board{suffix}.txt`.
pub fn archive_file_name(n: usize, k: usize, goal: i32, symmetric: bool, suffix: &str) -> String {
    let sym = if symmetric { "_sym" } else { "" };
    format!("N{n}_K{k}_goal{goal}{sym}_board{suffix}.txt")
}

/// The default on-disk locations of both archive sides.
pub fn default_archive_paths(common: &CommonConfig) -> (PathBuf, PathBuf) {
    let name = archive_file_name(common.n(), common.k(), common.goal, common.symmetric, "");
    (Path::new("winning").join(&name), Path::new("losing").join(&name))
}

/// Timestamped snapshot locations under `temp/` for long runs.
pub fn temp_archive_paths(common: &CommonConfig, suffix: &str) -> (PathBuf, PathBuf) {
    let suffix = format!("_{suffix}");
    let name = archive_file_name(common.n(), common.k(), common.goal, common.symmetric, &suffix);
    (
        Path::new("temp").join("winning").join(&name),
        Path::new("temp").join("losing").join(&name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(k_and_n: Vec<(usize, usize)>, goal: i32, symmetric: bool) -> CommonConfig {
        CommonConfig { k_and_n, goal, symmetric }
    }

    #[test]
    fn test_parse_full_config() {
        let text = r#"{
            "common": { "k-and-n": [[3, 2], [2, 1]], "goal": 4, "symmetric": true },
            "minimax": {
                "files-to-load-from": { "winning": ["w.txt"], "losing": [] },
                "hours-per-save": 0.5,
                "threads": 4
            },
            "verify": { "threads": 2, "log-frequency": { "winning": 5, "losing": 25 } },
            "ignored-key": 17
        }"#;
        let config: Config = serde_json::from_str(text).unwrap();
        assert_eq!(config.common.k_and_n, vec![(3, 2), (2, 1)]);
        assert_eq!(config.common.goal, 4);
        assert!(config.common.symmetric);
        assert_eq!(config.minimax.threads, 4);
        assert_eq!(config.minimax.files_to_load_from.winning, vec![PathBuf::from("w.txt")]);
        assert_eq!(config.verify.log_frequency.losing, 25);
    }

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let text = r#"{ "common": { "k-and-n": [[2, 2]], "goal": 2 } }"#;
        let config: Config = serde_json::from_str(text).unwrap();
        assert!(!config.common.symmetric);
        assert_eq!(config.minimax.hours_per_save, 0.0);
        assert_eq!(config.minimax.threads, 8);
        assert_eq!(config.verify.log_frequency.winning, 10);
    }

    #[test]
    fn test_missing_common_is_an_error() {
        assert!(serde_json::from_str::<Config>(r#"{ "minimax": {} }"#).is_err());
    }

    #[test]
    fn test_initial_board_mixed_heights() {
        let board = common(vec![(2, 1), (3, 2)], 5, false).initial_board();
        assert_eq!(board.n(), 3);
        assert_eq!(board.k(), 3);
        // Tallest group first; short columns pad with removed slots.
        assert_eq!(board.column_rows(0), vec![0, 0, 0]);
        assert_eq!(board.column_rows(1), vec![0, 0, 0]);
        assert_eq!(board.column_rows(2), vec![0, 0, -1]);
        assert_eq!(board.num_chips(), 8);
    }

    #[test]
    fn test_initial_state_is_pushers_turn() {
        let state = common(vec![(2, 2)], 2, false).initial_state();
        assert_eq!(state.current_player(), Some(chippush_core::Player::Pusher));
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_archive_file_name_template() {
        assert_eq!(archive_file_name(5, 3, 6, false, ""), "N5_K3_goal6_board.txt");
        assert_eq!(archive_file_name(5, 3, 6, true, ""), "N5_K3_goal6_sym_board.txt");
        assert_eq!(
            archive_file_name(2, 2, 2, false, "_1700000000"),
            "N2_K2_goal2_board_1700000000.txt"
        );
    }

    #[test]
    fn test_default_paths_split_by_side() {
        let (winning, losing) = default_archive_paths(&common(vec![(2, 2)], 2, false));
        assert_eq!(winning, Path::new("winning").join("N2_K2_goal2_board.txt"));
        assert_eq!(losing, Path::new("losing").join("N2_K2_goal2_board.txt"));
    }
}
