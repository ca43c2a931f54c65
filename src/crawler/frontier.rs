//! Crawl frontier: deduplication, per-origin politeness and fairness
//!
//! The frontier owns every discovered-but-not-yet-dispatched URL. Work is
//! grouped by origin; origins are ordered in a readiness index by how many
//! entries they have already dispatched (fewest first), then by the sequence
//! number they were (re)inserted with. Each origin keeps its own cooldown
//! clock, so independent origins run at full speed while each individual
//! origin is throttled to one dispatch per politeness interval.
//!
//! The frontier is a plain synchronous data structure; [`super::Scheduler`]
//! wraps it for concurrent workers and turns "not ready yet" into a timed wait.

use crate::state::OriginState;
use crate::url::extract_origin;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;

/// A unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Link distance from the seed this URL was reached from
    pub depth: u32,

    /// The normalized URL to fetch
    pub url: String,
}

/// Outcome of asking the frontier for work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// An entry whose origin was eligible; it has been removed from the frontier
    Ready(FrontierEntry),

    /// Work exists but every origin holding it is cooling down until at least `until`
    NotReady { until: Instant },

    /// Nothing is pending
    Empty,
}

/// Key of an origin in the readiness index
///
/// Ordered so that the smallest `(dispatch_count, sequence)` pops first from
/// a max-heap.
#[derive(Debug, Clone)]
struct ReadinessKey {
    dispatch_count: u64,
    sequence: u64,
    origin: String,
}

impl Ord for ReadinessKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse comparison so lower counts (then earlier sequences) come first
        other
            .dispatch_count
            .cmp(&self.dispatch_count)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for ReadinessKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ReadinessKey {
    fn eq(&self, other: &Self) -> bool {
        self.dispatch_count == other.dispatch_count && self.sequence == other.sequence
    }
}

impl Eq for ReadinessKey {}

/// Every URL the frontier has ever accepted
///
/// Membership is permanent for the lifetime of the frontier. This is an exact
/// set, so memory grows with the number of distinct URLs accepted; that is the
/// price of never re-crawling a URL and never rejecting a new one by mistake.
/// A bounded probabilistic filter would cap memory but turn some first-time
/// URLs into false duplicates.
#[derive(Debug, Default)]
struct SeenSet {
    urls: HashSet<String>,
}

impl SeenSet {
    /// Inserts the URL, returning false if it was already present
    fn insert(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    fn len(&self) -> usize {
        self.urls.len()
    }
}

/// The crawl frontier
///
/// # Invariants
///
/// - a URL is accepted at most once over the frontier's lifetime
/// - an origin with pending work has exactly one readiness entry; an origin
///   without pending work has none
/// - an entry is never returned while its origin's cooldown is running
/// - an origin's dispatch count only grows
#[derive(Debug, Default)]
pub struct Frontier {
    /// Per-origin queues and clocks, kept after an origin drains
    origins: HashMap<String, OriginState>,

    /// Origins with pending work, in fairness order
    readiness: BinaryHeap<ReadinessKey>,

    seen: SeenSet,

    next_sequence: u64,

    /// Total entries across all origin queues
    pending: usize,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL discovered at `depth`
    ///
    /// The URL must already be normalized and policy-filtered. Returns true if
    /// the URL was accepted; false if it was seen before or has no origin
    /// (hostless URLs are not recorded as seen).
    pub fn enqueue(&mut self, url: &str, depth: u32) -> bool {
        let Some(origin) = extract_origin(url) else {
            tracing::debug!("Rejecting URL without origin: {}", url);
            return false;
        };

        if !self.seen.insert(url) {
            tracing::trace!("Already seen: {}", url);
            return false;
        }

        let state = self.origins.entry(origin.clone()).or_default();
        state.pending.push_back(FrontierEntry {
            depth,
            url: url.to_string(),
        });
        self.pending += 1;

        if !state.indexed {
            state.indexed = true;
            let sequence = self.next_sequence;
            self.next_sequence += 1;
            self.readiness.push(ReadinessKey {
                dispatch_count: state.dispatch_count,
                sequence,
                origin,
            });
        }

        true
    }

    /// Takes the next entry whose origin is eligible at the current instant
    pub fn dequeue_ready(&mut self, politeness: Duration) -> Readiness {
        self.dequeue_ready_at(politeness, Instant::now())
    }

    /// Takes the next entry whose origin is eligible at `now`
    ///
    /// Origins are considered in fairness order. Origins still cooling down
    /// are skipped (and keep their keys), so a throttled origin at the head
    /// never blocks an eligible one behind it. The chosen origin's cooldown is
    /// restarted at `now` and it is re-indexed with its new dispatch count
    /// only while it still has pending work.
    pub fn dequeue_ready_at(&mut self, politeness: Duration, now: Instant) -> Readiness {
        let mut deferred = Vec::new();
        let mut earliest: Option<Instant> = None;
        let mut found = None;

        while let Some(key) = self.readiness.pop() {
            let Some(state) = self.origins.get_mut(&key.origin) else {
                continue;
            };

            if state.is_idle() {
                state.indexed = false;
                continue;
            }

            if let Some(until) = state.blocked_until(now) {
                earliest = Some(earliest.map_or(until, |e| e.min(until)));
                deferred.push(key);
                continue;
            }

            let Some(entry) = state.dispatch(now, politeness) else {
                continue;
            };
            self.pending -= 1;

            if state.is_idle() {
                state.indexed = false;
            } else {
                let sequence = self.next_sequence;
                self.next_sequence += 1;
                self.readiness.push(ReadinessKey {
                    dispatch_count: state.dispatch_count,
                    sequence,
                    origin: key.origin,
                });
            }

            found = Some(entry);
            break;
        }

        self.readiness.extend(deferred);

        match (found, earliest) {
            (Some(entry), _) => Readiness::Ready(entry),
            (None, Some(until)) => Readiness::NotReady { until },
            (None, None) => Readiness::Empty,
        }
    }

    /// Total number of pending entries across all origins
    pub fn size(&self) -> usize {
        self.pending
    }

    /// Returns whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// Number of origins currently holding pending work
    pub fn active_origins(&self) -> usize {
        self.readiness.len()
    }

    /// Number of distinct URLs ever accepted
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Number of entries dispatched so far for `origin`
    pub fn dispatch_count(&self, origin: &str) -> u64 {
        self.origins.get(origin).map_or(0, |s| s.dispatch_count)
    }

    /// Gets the state of a specific origin
    pub fn origin_state(&self, origin: &str) -> Option<&OriginState> {
        self.origins.get(origin)
    }
}
