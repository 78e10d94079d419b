//! Application state shared across HTTP handlers.

use rifa_core::clock::Clock;
use rifa_core::store::RaffleStore;
use rifa_core::{RaffleService, RatePolicy};
use std::sync::Arc;

/// Application state for the rifa server.
///
/// Generic over the storage bundle `S` so the production binary runs on the
/// SQLite backend while tests drive the identical router over
/// [`rifa_core::memory::MemoryStore`]. The state is cloned per request; `S`
/// is expected to be a cheap handle (a pool or an `Arc`).
#[derive(Clone)]
pub struct AppState<S> {
    /// Participation and draw use cases
    pub service: RaffleService<S>,
    /// Direct storage access for campaign management and statistics
    pub store: S,
    /// Time source consulted by handlers that reason about "now"
    pub clock: Arc<dyn Clock>,
}

impl<S> AppState<S>
where
    S: RaffleStore + Clone,
{
    /// Assemble the application state over a single storage handle.
    ///
    /// The service and the handlers share the same handle and the same
    /// clock, so everything in one process observes one timeline.
    #[must_use]
    pub fn new(store: S, policy: RatePolicy, clock: Arc<dyn Clock>) -> Self {
        let service = RaffleService::new(store.clone())
            .with_policy(policy)
            .with_clock(clock.clone());
        Self {
            service,
            store,
            clock,
        }
    }
}
