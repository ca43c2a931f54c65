//! End-of-run crawl report
//!
//! This module provides the summary returned by a crawl run and its
//! console rendering.

use crate::crawler::SchedulerStats;
use crate::metrics::MetricsSnapshot;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The frontier drained with nothing in flight
    Exhausted,
    /// The page budget was reached
    PageBudget,
    /// The run was cancelled
    Cancelled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "frontier exhausted",
            Self::PageBudget => "page budget reached",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Crawl run summary
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Entries handed to workers
    pub pages_dispatched: u64,

    /// Dispatched entries whose fetch returned a page
    pub pages_fetched: u64,

    /// Entries still pending when the run stopped
    pub pending: usize,

    /// Distinct URLs ever accepted by the frontier
    pub seen: usize,

    /// Origins that still had pending work
    pub active_origins: usize,

    pub stop_reason: StopReason,

    /// Present when metrics were enabled
    pub metrics: Option<MetricsSnapshot>,
}

impl CrawlReport {
    /// Builds a report from the scheduler's final state
    pub fn new(
        started_at: DateTime<Utc>,
        stats: SchedulerStats,
        page_budget: u64,
        cancelled: bool,
        metrics: Option<MetricsSnapshot>,
    ) -> Self {
        let stop_reason = if cancelled {
            StopReason::Cancelled
        } else if stats.fetched >= page_budget {
            StopReason::PageBudget
        } else {
            StopReason::Exhausted
        };

        Self {
            started_at,
            finished_at: Utc::now(),
            pages_dispatched: stats.dispatched,
            pages_fetched: stats.fetched,
            pending: stats.pending,
            seen: stats.seen,
            active_origins: stats.active_origins,
            stop_reason,
            metrics,
        }
    }

    /// Dispatched entries that did not yield a page
    pub fn pages_failed(&self) -> u64 {
        self.pages_dispatched.saturating_sub(self.pages_fetched)
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Run:");
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Finished: {}", report.finished_at.to_rfc3339());
    println!("  Duration: {}s", report.duration_seconds());
    println!("  Stopped: {}", report.stop_reason.as_str());
    println!();

    println!("Pages:");
    println!("  Dispatched: {}", report.pages_dispatched);
    println!("  Fetched: {}", report.pages_fetched);
    println!("  Failed: {}", report.pages_failed());
    println!();

    println!("Frontier:");
    println!("  URLs seen: {}", report.seen);
    println!("  Still pending: {}", report.pending);
    println!("  Origins with pending work: {}", report.active_origins);
    println!();

    if let Some(metrics) = &report.metrics {
        println!("Fetch Metrics:");
        println!(
            "  Requests: {} ({} ok, {} err)",
            metrics.pages_total, metrics.pages_ok, metrics.pages_err
        );
        println!("  Origins fetched: {}", metrics.origin_count());
        println!(
            "  Latency: mean {} ms, max {} ms",
            metrics.mean_latency().as_millis(),
            metrics.latency_max.as_millis()
        );

        // Busiest origins first
        let mut totals: HashMap<&str, u64> = HashMap::new();
        for ((origin, _), counters) in &metrics.by_origin {
            *totals.entry(origin.as_str()).or_default() += counters.total();
        }
        let mut per_origin: Vec<(&str, u64)> = totals.into_iter().collect();
        per_origin.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        for (origin, total) in per_origin.iter().take(10) {
            println!("  - {}: {}", origin, total);
        }
        println!();
    }

    let success_rate = if report.pages_dispatched > 0 {
        (report.pages_fetched as f64 / report.pages_dispatched as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully fetched)",
        success_rate, report.pages_fetched, report.pages_dispatched
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(dispatched: u64, fetched: u64) -> SchedulerStats {
        SchedulerStats {
            pending: 3,
            active_origins: 2,
            seen: 10,
            dispatched,
            fetched,
            in_flight: 0,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = CrawlReport::new(Utc::now(), stats(7, 5), 100, false, None);
        assert_eq!(report.pages_dispatched, 7);
        assert_eq!(report.pages_fetched, 5);
        assert_eq!(report.pages_failed(), 2);
        assert_eq!(report.pending, 3);
        assert_eq!(report.seen, 10);
        assert!(report.duration_seconds() >= 0);
    }

    #[test]
    fn test_stop_reason() {
        let exhausted = CrawlReport::new(Utc::now(), stats(7, 5), 100, false, None);
        assert_eq!(exhausted.stop_reason, StopReason::Exhausted);

        let budget = CrawlReport::new(Utc::now(), stats(7, 5), 5, false, None);
        assert_eq!(budget.stop_reason, StopReason::PageBudget);

        let cancelled = CrawlReport::new(Utc::now(), stats(7, 5), 5, true, None);
        assert_eq!(cancelled.stop_reason, StopReason::Cancelled);
    }
}
