//! Rate limiter storage trait.

use crate::error::Result;
use crate::limiter::{Gate, LimiterKey, RatePolicy};
use chrono::{DateTime, Utc};

/// Atomic check-and-record over per-key attempt counters.
///
/// Implementations share the pure [`crate::limiter::evaluate`] decision and
/// guarantee that the read-evaluate-write for one key cannot interleave
/// with another call for the same key: under N concurrent first-time calls
/// exactly `min(N, max_attempts)` are admitted and the stored counter lands
/// at that same value.
pub trait RateLimiter: Send + Sync {
    /// Evaluate the gate for `key` and, when admitted, persist the advanced
    /// counter. A deny writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure or unresolvable
    /// write contention.
    fn check_and_record(
        &self,
        key: &LimiterKey,
        policy: &RatePolicy,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Gate>> + Send;
}
