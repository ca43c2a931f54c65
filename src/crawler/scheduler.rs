//! Scheduler handing frontier work to concurrent fetch workers
//!
//! This module handles:
//! - Exclusive ownership of the frontier behind an async mutex
//! - Timed waits until the earliest cooling origin becomes eligible
//! - Wake-ups when new work is enqueued or an in-flight fetch completes
//! - The page budget and cancellation
//!
//! Workers never touch frontier state directly. They call [`Scheduler::next`],
//! fetch, enqueue what they discovered, then call [`Scheduler::complete`].

use crate::crawler::frontier::{Frontier, FrontierEntry, Readiness};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

/// Point-in-time view of the scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Entries waiting in the frontier
    pub pending: usize,

    /// Origins holding pending work
    pub active_origins: usize,

    /// URLs ever accepted by the frontier
    pub seen: usize,

    /// Entries handed out to workers
    pub dispatched: u64,

    /// Dispatched entries whose fetch succeeded
    pub fetched: u64,

    /// Dispatched entries not yet completed
    pub in_flight: usize,
}

struct Inner {
    frontier: Frontier,
    dispatched: u64,
    fetched: u64,
    in_flight: usize,
    closed: bool,
}

impl Inner {
    /// In-flight fetches count against the budget until they complete
    fn budget_exhausted(&self, page_budget: u64) -> bool {
        self.fetched + self.in_flight as u64 >= page_budget
    }
}

/// What a call to `next` should wait for before trying again
enum Wait {
    Until(Instant),
    Wakeup,
}

/// Scheduler coordinating workers around a shared frontier
///
/// The scheduler coordinates:
/// - Per-origin politeness (enforced by the frontier at dispatch time)
/// - Termination once the frontier is empty and nothing is in flight
/// - The page budget (successful fetches plus fetches still in flight)
/// - Cancellation through [`Scheduler::close`]
pub struct Scheduler {
    inner: Mutex<Inner>,
    notify: Notify,
    politeness: Duration,
    page_budget: u64,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `frontier` - The frontier to drain, possibly already seeded
    /// * `politeness` - Minimum spacing between dispatches to the same origin
    /// * `page_budget` - Successful fetches after which no more work is handed out
    pub fn new(frontier: Frontier, politeness: Duration, page_budget: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                frontier,
                dispatched: 0,
                fetched: 0,
                in_flight: 0,
                closed: false,
            }),
            notify: Notify::new(),
            politeness,
            page_budget,
        }
    }

    /// Adds a URL to the frontier, waking any waiting worker if it was accepted
    pub async fn enqueue(&self, url: &str, depth: u32) -> bool {
        self.enqueue_all([(url.to_string(), depth)]).await == 1
    }

    /// Adds many URLs under a single lock, returning how many were accepted
    pub async fn enqueue_all<I>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        let accepted = {
            let mut inner = self.inner.lock().await;
            urls.into_iter()
                .filter(|(url, depth)| inner.frontier.enqueue(url, *depth))
                .count()
        };

        if accepted > 0 {
            self.notify.notify_waiters();
        }
        accepted
    }

    /// Gets the next entry to fetch
    ///
    /// This method:
    /// 1. Returns None once the scheduler is closed
    /// 2. Waits for in-flight fetches while the page budget is reserved
    /// 3. Returns an entry as soon as some origin is eligible
    /// 4. Sleeps until the earliest cooldown ends (or a wake-up) when every
    ///    origin with work is cooling down
    /// 5. Closes and returns None once the frontier is empty and no fetch is
    ///    in flight; otherwise waits, since in-flight fetches may add work
    ///
    /// # Returns
    ///
    /// * `Some(FrontierEntry)` - An entry that's ready to fetch; the caller
    ///   must report it back through [`Scheduler::complete`]
    /// * `None` - The crawl is over
    pub async fn next(&self) -> Option<FrontierEntry> {
        loop {
            // Register for wake-ups before inspecting state so none are lost
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let wait = {
                let mut inner = self.inner.lock().await;

                if inner.closed {
                    return None;
                }

                if inner.budget_exhausted(self.page_budget) {
                    if inner.in_flight == 0 {
                        tracing::info!("Page budget of {} reached", self.page_budget);
                        self.close_locked(&mut inner);
                        return None;
                    }
                    Wait::Wakeup
                } else {
                    match inner.frontier.dequeue_ready(self.politeness) {
                        Readiness::Ready(entry) => {
                            inner.in_flight += 1;
                            inner.dispatched += 1;
                            tracing::debug!("Dispatching {} (depth {})", entry.url, entry.depth);
                            return Some(entry);
                        }
                        Readiness::NotReady { until } => {
                            tracing::trace!(
                                "No origin ready, waiting {:?}. Frontier size: {}",
                                until.saturating_duration_since(Instant::now()),
                                inner.frontier.size()
                            );
                            Wait::Until(until)
                        }
                        Readiness::Empty => {
                            if inner.in_flight == 0 {
                                tracing::info!("Frontier is empty, crawl complete");
                                self.close_locked(&mut inner);
                                return None;
                            }
                            Wait::Wakeup
                        }
                    }
                }
            };

            match wait {
                Wait::Until(until) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(until) => {}
                        _ = notified.as_mut() => {}
                    }
                }
                Wait::Wakeup => notified.await,
            }
        }
    }

    /// Reports that a dispatched entry has been processed
    ///
    /// Call after enqueueing any links discovered on the page, so that the
    /// scheduler never observes an empty frontier with that work missing.
    ///
    /// # Arguments
    ///
    /// * `fetched` - Whether the fetch succeeded (counts toward the page budget)
    pub async fn complete(&self, fetched: bool) {
        {
            let mut inner = self.inner.lock().await;
            inner.in_flight = inner.in_flight.saturating_sub(1);
            if fetched {
                inner.fetched += 1;
            }
        }
        self.notify.notify_waiters();
    }

    /// Stops handing out work
    ///
    /// Pending and future calls to [`Scheduler::next`] return None. Fetches
    /// already dispatched are unaffected and may still call `complete`.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.closed {
            tracing::info!("Scheduler closed with {} entries pending", inner.frontier.size());
        }
        self.close_locked(&mut inner);
    }

    fn close_locked(&self, inner: &mut Inner) {
        inner.closed = true;
        self.notify.notify_waiters();
    }

    /// Returns the number of entries waiting in the frontier
    pub async fn size(&self) -> usize {
        self.inner.lock().await.frontier.size()
    }

    /// Returns whether the scheduler has stopped handing out work
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }

    /// Returns a snapshot of the scheduler's counters
    pub async fn stats(&self) -> SchedulerStats {
        let inner = self.inner.lock().await;
        SchedulerStats {
            pending: inner.frontier.size(),
            active_origins: inner.frontier.active_origins(),
            seen: inner.frontier.seen_count(),
            dispatched: inner.dispatched,
            fetched: inner.fetched,
            in_flight: inner.in_flight,
        }
    }

    /// Returns the configured politeness interval
    pub fn politeness(&self) -> Duration {
        self.politeness
    }
}
