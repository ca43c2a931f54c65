use crate::crawler::FrontierEntry;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Tracks the state of an origin inside the frontier
///
/// Holds the origin's pending work (FIFO), its politeness clock, and the
/// cumulative dispatch count that drives fairness ordering. The state outlives
/// the origin's pending work so that a re-activated origin keeps its
/// cooldown and its place in the fairness order.
#[derive(Debug, Clone, Default)]
pub struct OriginState {
    /// Entries waiting to be dispatched, in insertion order
    pub pending: VecDeque<FrontierEntry>,

    /// Earliest instant a dispatch from this origin may happen
    pub next_allowed: Option<Instant>,

    /// Number of entries ever dispatched for this origin
    pub dispatch_count: u64,

    /// Whether the origin currently has an entry in the readiness index
    pub indexed: bool,
}

impl OriginState {
    /// Creates an empty origin with no cooldown
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a dispatch may happen at `now`
    ///
    /// Only the politeness clock is consulted; an origin with no pending work
    /// can still be "ready".
    pub fn can_dispatch(&self, now: Instant) -> bool {
        self.next_allowed.map_or(true, |at| now >= at)
    }

    /// Returns the instant the cooldown ends, or None if dispatch is allowed now
    pub fn blocked_until(&self, now: Instant) -> Option<Instant> {
        self.next_allowed.filter(|at| now < *at)
    }

    /// Calculates the time until the next dispatch can be made
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        self.blocked_until(now).map(|at| at - now)
    }

    /// Pops the front entry, bumping the dispatch count and restarting the cooldown
    ///
    /// Returns None (and changes nothing) if there is no pending work.
    pub fn dispatch(&mut self, now: Instant, politeness: Duration) -> Option<FrontierEntry> {
        let entry = self.pending.pop_front()?;
        self.dispatch_count += 1;
        self.next_allowed = Some(now + politeness);
        Some(entry)
    }

    /// Returns true if the origin has nothing left to dispatch
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}
