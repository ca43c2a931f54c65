//! Fetch metrics
//!
//! This module handles:
//! - The [`MetricsSink`] seam the crawl loop reports every fetch through
//! - [`CrawlMetrics`], in-process counters with a periodic log reporter
//! - [`NoopMetrics`] for runs with metrics disabled
//!
//! Metrics are write-only from the crawler's point of view: nothing recorded
//! here feeds back into scheduling.

use crate::config::MetricsConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Receives one event per completed fetch
pub trait MetricsSink: Send + Sync {
    /// Records a fetch outcome
    ///
    /// # Arguments
    ///
    /// * `origin` - The origin the URL belongs to
    /// * `depth` - The entry's crawl depth
    /// * `latency` - Wall time spent in the fetch
    /// * `success` - Whether a page body was retrieved
    fn record_fetch(&self, origin: &str, depth: u32, latency: Duration, success: bool);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_fetch(&self, _origin: &str, _depth: u32, _latency: Duration, _success: bool) {}
}

/// Counters for one `(origin, depth)` pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OriginCounters {
    pub ok: u64,
    pub err: u64,
}

impl OriginCounters {
    pub fn total(&self) -> u64 {
        self.ok + self.err
    }
}

/// Point-in-time copy of [`CrawlMetrics`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub pages_total: u64,
    pub pages_ok: u64,
    pub pages_err: u64,
    pub latency_total: Duration,
    pub latency_max: Duration,
    pub by_origin: HashMap<(String, u32), OriginCounters>,
}

impl MetricsSnapshot {
    /// Mean fetch latency, or zero before the first fetch
    pub fn mean_latency(&self) -> Duration {
        if self.pages_total == 0 {
            return Duration::ZERO;
        }
        let micros = self.latency_total.as_micros() / u128::from(self.pages_total);
        Duration::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
    }

    /// Number of distinct origins that saw at least one fetch
    pub fn origin_count(&self) -> usize {
        let mut origins: Vec<&str> = self.by_origin.keys().map(|(o, _)| o.as_str()).collect();
        origins.sort_unstable();
        origins.dedup();
        origins.len()
    }
}

/// In-process fetch counters
#[derive(Debug, Default)]
pub struct CrawlMetrics {
    pages_total: AtomicU64,
    pages_ok: AtomicU64,
    pages_err: AtomicU64,
    latency_total_us: AtomicU64,
    latency_max_us: AtomicU64,
    by_origin: Mutex<HashMap<(String, u32), OriginCounters>>,
}

impl CrawlMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the current counter values
    pub fn snapshot(&self) -> MetricsSnapshot {
        let by_origin = self
            .by_origin
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        MetricsSnapshot {
            pages_total: self.pages_total.load(Ordering::Relaxed),
            pages_ok: self.pages_ok.load(Ordering::Relaxed),
            pages_err: self.pages_err.load(Ordering::Relaxed),
            latency_total: Duration::from_micros(self.latency_total_us.load(Ordering::Relaxed)),
            latency_max: Duration::from_micros(self.latency_max_us.load(Ordering::Relaxed)),
            by_origin,
        }
    }

    /// Logs the current snapshot at info level
    pub fn report(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            pages_total = snapshot.pages_total,
            pages_ok = snapshot.pages_ok,
            pages_err = snapshot.pages_err,
            origins = snapshot.origin_count(),
            "Fetch latency mean {:?}, max {:?}",
            snapshot.mean_latency(),
            snapshot.latency_max
        );
    }
}

impl MetricsSink for CrawlMetrics {
    fn record_fetch(&self, origin: &str, depth: u32, latency: Duration, success: bool) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);

        self.pages_total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.pages_ok.fetch_add(1, Ordering::Relaxed);
        } else {
            self.pages_err.fetch_add(1, Ordering::Relaxed);
        }
        self.latency_total_us.fetch_add(micros, Ordering::Relaxed);
        self.latency_max_us.fetch_max(micros, Ordering::Relaxed);

        let mut by_origin = self
            .by_origin
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let counters = by_origin.entry((origin.to_string(), depth)).or_default();
        if success {
            counters.ok += 1;
        } else {
            counters.err += 1;
        }
    }
}

/// Logs a metrics snapshot every `interval` until the handle is aborted
pub fn spawn_reporter(metrics: Arc<CrawlMetrics>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            metrics.report();
        }
    })
}

/// Builds the sink described by the configuration
///
/// Returns the concrete [`CrawlMetrics`] alongside the sink when metrics are
/// enabled, so the caller can start a reporter and read the final snapshot.
pub fn from_config(config: &MetricsConfig) -> (Arc<dyn MetricsSink>, Option<Arc<CrawlMetrics>>) {
    if config.enabled {
        let metrics = Arc::new(CrawlMetrics::new());
        (metrics.clone(), Some(metrics))
    } else {
        (Arc::new(NoopMetrics), None)
    }
}
