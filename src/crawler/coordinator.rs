//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the collaborators together:
//! - Seeding the frontier through the URL policy
//! - Running a pool of fetch workers against the shared scheduler
//! - Extracting, filtering and enqueueing discovered links
//! - Recording fetch metrics
//! - Handling interrupts and producing the final report

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, FetchResult, Fetcher, HttpFetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::extract_links;
use crate::crawler::scheduler::Scheduler;
use crate::metrics::{self, spawn_reporter, MetricsSink};
use crate::output::CrawlReport;
use crate::seeds::{discover_seeds, load_seeds, HtmlSearchDiscovery};
use crate::url::{extract_origin, UrlPolicy};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Main crawler coordinator structure
///
/// Cloning is cheap: every clone shares the same scheduler and collaborators,
/// which is how each worker task gets its handle.
#[derive(Clone)]
pub struct Coordinator {
    config: Arc<Config>,
    scheduler: Arc<Scheduler>,
    fetcher: Arc<dyn Fetcher>,
    policy: Arc<UrlPolicy>,
    metrics: Arc<dyn MetricsSink>,
    cancelled: Arc<AtomicBool>,
}

/// Stops a running crawl from outside the worker pool
#[derive(Clone)]
pub struct CancelHandle {
    scheduler: Arc<Scheduler>,
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Closes the scheduler; in-flight fetches finish and are still counted
    pub async fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.scheduler.close().await;
    }
}

impl Coordinator {
    /// Creates a new coordinator with an empty frontier
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Retrieves pages
    /// * `metrics` - Receives one event per fetch
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>, metrics: Arc<dyn MetricsSink>) -> Self {
        let scheduler = Scheduler::new(
            Frontier::new(),
            config.crawler.politeness(),
            config.crawler.max_pages,
        );
        let policy = UrlPolicy::from_config(&config.policy);

        Self {
            config: Arc::new(config),
            scheduler: Arc::new(scheduler),
            fetcher,
            policy: Arc::new(policy),
            metrics,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Enqueues seed URLs at depth 0
    ///
    /// Each seed is normalized and checked against the URL policy. Invalid
    /// or rejected seeds are logged and skipped.
    ///
    /// # Returns
    ///
    /// The number of seeds accepted by the frontier
    pub async fn seed<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut admitted = Vec::new();
        for url in urls {
            let url = url.as_ref();
            match self.policy.normalize(url) {
                Ok(normalized) if self.policy.should_enqueue(&normalized) => {
                    admitted.push((normalized, 0))
                }
                Ok(normalized) => tracing::warn!("Seed {} rejected by URL policy", normalized),
                Err(e) => tracing::warn!("Skipping invalid seed {:?}: {}", url, e),
            }
        }

        let accepted = self.scheduler.enqueue_all(admitted).await;
        tracing::info!("Seeded frontier with {} URLs", accepted);
        accepted
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            scheduler: self.scheduler.clone(),
            cancelled: self.cancelled.clone(),
        }
    }

    /// Runs the crawl until the frontier drains, the page budget is reached,
    /// or the crawl is cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl finished
    /// * `Err(RippleError::Worker)` - A worker task panicked
    pub async fn run(&self) -> crate::Result<CrawlReport> {
        let started_at = Utc::now();
        let workers = self.config.crawler.workers.max(1);
        tracing::info!(
            "Starting crawl with {} workers, politeness {:?}, max depth {}, page budget {}",
            workers,
            self.scheduler.politeness(),
            self.config.crawler.max_depth,
            self.config.crawler.max_pages
        );

        let mut tasks = JoinSet::new();
        for id in 0..workers {
            let worker = self.clone();
            tasks.spawn(async move { worker.work(id).await });
        }

        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker failed: {}", e);
                // Remaining workers would wait forever on the lost in-flight entry
                self.scheduler.close().await;
                failure.get_or_insert(e);
            }
        }
        if let Some(e) = failure {
            return Err(e.into());
        }

        let stats = self.scheduler.stats().await;
        let report = CrawlReport::new(
            started_at,
            stats,
            self.config.crawler.max_pages,
            self.cancelled.load(Ordering::SeqCst),
            None,
        );

        tracing::info!(
            "Crawl completed: {} pages fetched, {} dispatched, {} pending, in {}s",
            report.pages_fetched,
            report.pages_dispatched,
            report.pending,
            report.duration_seconds()
        );

        Ok(report)
    }

    /// Worker loop: pull, process, report back
    async fn work(&self, id: u32) {
        tracing::debug!("Worker {} started", id);
        while let Some(entry) = self.scheduler.next().await {
            let fetched = self.process(&entry).await;
            self.scheduler.complete(fetched).await;
        }
        tracing::debug!("Worker {} finished", id);
    }

    /// Processes a single entry
    ///
    /// This method:
    /// 1. Fetches the page
    /// 2. Records metrics and logs the outcome
    /// 3. Extracts links against the final URL when the next depth is allowed
    /// 4. Normalizes, filters and enqueues them at `depth + 1`
    ///
    /// Returns whether the fetch produced a page.
    async fn process(&self, entry: &FrontierEntry) -> bool {
        let origin = extract_origin(&entry.url).unwrap_or_default();

        let started = Instant::now();
        let result = self
            .fetcher
            .fetch(&entry.url, self.config.crawler.fetch_timeout())
            .await;
        let latency = started.elapsed();

        let success = result.is_success();
        self.metrics
            .record_fetch(&origin, entry.depth, latency, success);

        tracing::info!(
            "[depth {}] {} -> {} ({} ms)",
            entry.depth,
            entry.url,
            result.describe(),
            latency.as_millis()
        );

        let (final_url, body) = match result {
            FetchResult::Success {
                final_url, body, ..
            } => (final_url, body),
            _ => return false,
        };

        let next_depth = entry.depth + 1;
        if next_depth > self.config.crawler.max_depth {
            return true;
        }

        let discovered: Vec<(String, u32)> = extract_links(&final_url, &body)
            .iter()
            .filter_map(|link| self.policy.admit(link))
            .map(|url| (url, next_depth))
            .collect();

        let found = discovered.len();
        let accepted = self.scheduler.enqueue_all(discovered).await;
        tracing::debug!(
            "{}: {} links admitted, {} new",
            final_url,
            found,
            accepted
        );

        true
    }
}

/// Runs the main crawl operation
///
/// This function wires the full crawl together:
///
/// 1. Load seeds from the seed file (fatal if missing)
/// 2. Supplement them through search discovery, if configured (best effort)
/// 3. Build the HTTP client and metrics sink
/// 4. Install a Ctrl-C handler that cancels the crawl
/// 5. Start the periodic metrics reporter
/// 6. Run the worker pool to completion
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seeds_override` - Seed file to use instead of the configured one
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed, hit its budget, or was cancelled
/// * `Err(RippleError)` - Startup failed
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::load_config;
/// use ripple_crawl::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(config, None).await?;
/// println!("{} pages fetched", report.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    seeds_override: Option<PathBuf>,
) -> crate::Result<CrawlReport> {
    let seeds_path = seeds_override.unwrap_or_else(|| PathBuf::from(&config.seeds.path));
    let mut seeds = load_seeds(&seeds_path)?;
    tracing::info!("Loaded {} seeds from {}", seeds.len(), seeds_path.display());

    let client = build_http_client(&config.user_agent)?;

    if let Some(discovery) = &config.seeds.discovery {
        match HtmlSearchDiscovery::new(client.clone(), &discovery.endpoint) {
            Ok(provider) => {
                let found =
                    discover_seeds(&provider, &discovery.query, discovery.max_results).await;
                seeds.extend(found);
            }
            Err(e) => tracing::warn!("Seed discovery disabled: {}", e),
        }
    }

    let (sink, crawl_metrics) = metrics::from_config(&config.metrics);
    let report_interval = Duration::from_secs(config.metrics.report_interval);

    let coordinator = Coordinator::new(config, Arc::new(HttpFetcher::new(client)), sink);
    if coordinator.seed(&seeds).await == 0 {
        tracing::warn!("No usable seed URLs, nothing to crawl");
    }

    let cancel = coordinator.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight fetches");
            cancel.cancel().await;
        }
    });

    let reporter = crawl_metrics
        .as_ref()
        .map(|m| spawn_reporter(m.clone(), report_interval));

    let result = coordinator.run().await;

    interrupt.abort();
    if let Some(reporter) = reporter {
        reporter.abort();
    }

    let mut report = result?;
    if let Some(m) = crawl_metrics {
        m.report();
        report.metrics = Some(m.snapshot());
    }

    Ok(report)
}
