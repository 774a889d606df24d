//! Search statistics and progress logging.

use std::time::Instant;

use chippush_core::Player;

/// Resident set size in bytes, read from /proc on Linux.
#[cfg(target_os = "linux")]
pub fn memory_usage() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

#[cfg(not(target_os = "linux"))]
pub fn memory_usage() -> Option<u64> {
    None
}

/// Format bytes as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Counters collected while solving.
#[derive(Debug)]
pub struct SolverStats {
    /// Frames popped with a settled verdict.
    pub frames_visited: u64,
    /// Frames whose children were generated and explored.
    pub frames_expanded: u64,
    /// Verdicts the archive settled without expansion, by winner.
    pub pusher_predictions: u64,
    pub remover_predictions: u64,
    /// Siblings discarded because their parent was already decided.
    pub siblings_skipped: u64,
    /// High-water mark of the DFS stack.
    pub max_stack: usize,

    start_time: Instant,
    last_log_time: Instant,
    last_log_visited: u64,
}

impl SolverStats {
    pub fn new() -> Self {
        Self {
            frames_visited: 0,
            frames_expanded: 0,
            pusher_predictions: 0,
            remover_predictions: 0,
            siblings_skipped: 0,
            max_stack: 0,
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            last_log_visited: 0,
        }
    }

    pub fn record_prediction(&mut self, winner: Player) {
        match winner {
            Player::Pusher => self.pusher_predictions += 1,
            Player::Remover => self.remover_predictions += 1,
        }
    }

    pub fn should_log(&self, interval_secs: u64) -> bool {
        self.last_log_time.elapsed().as_secs() >= interval_secs
    }

    /// Print one progress line and reset the rate window.
    pub fn log_progress(&mut self, winning: usize, losing: usize, stack: usize) {
        let elapsed = self.start_time.elapsed().as_secs();
        let window = self.last_log_time.elapsed().as_secs_f64();
        let rate = if window > 0.0 {
            (self.frames_visited - self.last_log_visited) as f64 / window
        } else {
            0.0
        };
        let mem = memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        println!(
            "[{:02}:{:02}:{:02}] visited={} expanded={} rate={:.0}/s stack={} archive={}W/{}L{}",
            elapsed / 3600,
            (elapsed % 3600) / 60,
            elapsed % 60,
            self.frames_visited,
            self.frames_expanded,
            rate,
            stack,
            winning,
            losing,
            mem,
        );

        self.last_log_time = Instant::now();
        self.last_log_visited = self.frames_visited;
    }

    /// Print the end-of-run summary.
    pub fn print_summary(&self) {
        println!("Frames visited: {}", self.frames_visited);
        println!("Frames expanded: {}", self.frames_expanded);
        println!(
            "Archive predictions: {} for Pusher, {} for Remover",
            self.pusher_predictions, self.remover_predictions
        );
        println!("Siblings skipped: {}", self.siblings_skipped);
        println!("Max stack depth: {}", self.max_stack);

        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            println!(
                "Average rate: {:.0} frames/sec",
                self.frames_visited as f64 / elapsed
            );
        }
    }
}

impl Default for SolverStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_record_prediction_buckets_by_winner() {
        let mut stats = SolverStats::new();
        stats.record_prediction(Player::Pusher);
        stats.record_prediction(Player::Remover);
        stats.record_prediction(Player::Remover);
        assert_eq!(stats.pusher_predictions, 1);
        assert_eq!(stats.remover_predictions, 2);
    }
}
