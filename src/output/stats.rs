//! Per-session crawl statistics
//!
//! Counters are updated by the coordinator at every sub-batch barrier and
//! printed when the session ends.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Crawl statistics summary for one session
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Rounds started (each round is one pass over the pending queue)
    pub rounds: u64,

    /// Pages handed to a worker, including retries
    pub pages_dispatched: u64,

    /// Records written to the sink
    pub articles_written: u64,

    /// Pages whose links were followed but whose text was already recorded
    pub already_visited: u64,

    /// Failed attempts (each is requeued or dead-lettered)
    pub failures: u64,

    /// URLs dropped after exhausting their attempt budget
    pub dead_lettered: u64,

    /// Size of the visited set when the session ended, checkpointed URLs included
    pub visited_total: u64,

    /// URLs still pending when the session ended
    pub pending_at_exit: u64,

    /// Whether the session was stopped before the frontier drained
    pub interrupted: bool,
}

impl CrawlStatistics {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            rounds: 0,
            pages_dispatched: 0,
            articles_written: 0,
            already_visited: 0,
            failures: 0,
            dead_lettered: 0,
            visited_total: 0,
            pending_at_exit: 0,
            interrupted: false,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of dispatched pages that succeeded, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_dispatched == 0 {
            return 0.0;
        }
        let succeeded = self.pages_dispatched - self.failures.min(self.pages_dispatched);
        succeeded as f64 / self.pages_dispatched as f64 * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Session:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    if stats.interrupted {
        println!("  Stopped before the frontier was exhausted");
    }
    println!();

    println!("Pages:");
    println!("  Rounds: {}", stats.rounds);
    println!("  Dispatched: {}", stats.pages_dispatched);
    println!("  Articles written: {}", stats.articles_written);
    println!("  Already visited: {}", stats.already_visited);
    println!("  Failed attempts: {}", stats.failures);
    println!("  Dead-lettered: {}", stats.dead_lettered);
    println!();

    println!("Frontier:");
    println!("  Visited in total: {}", stats.visited_total);
    println!("  Pending at exit: {}", stats.pending_at_exit);
    println!();

    println!(
        "Success Rate: {:.1}% ({} failed of {} dispatched)",
        stats.success_rate(),
        stats.failures,
        stats.pages_dispatched
    );
}
