//! Rate limiter queries.
//!
//! The decision itself is the pure [`evaluate`] shared with every other
//! backend; this module only makes the read-evaluate-write atomic. Writes
//! are guarded by the previously observed row (an optimistic CAS), so two
//! interleaved calls for the same key cannot both advance from the same
//! counter value.

use crate::db::RaffleDatabase;
use crate::models::{storage, to_millis, RateLimitRow};
use chrono::{DateTime, Utc};
use rifa_core::limiter::{evaluate, AttemptWindow, Gate, LimiterKey, RatePolicy};
use rifa_core::store::RateLimiter;
use rifa_core::RaffleError;

/// Retries before giving up on a contended key. Each retry re-reads the
/// row, so progress is only blocked while other writers keep landing
/// between our read and our guarded write.
const CAS_RETRIES: u32 = 8;

impl RaffleDatabase {
    async fn limiter_row(&self, key: &LimiterKey) -> Result<Option<RateLimitRow>, RaffleError> {
        sqlx::query_as::<_, RateLimitRow>(
            "SELECT attempts, last_attempt FROM rate_limits \
             WHERE identifier = ? AND class = ? AND campaign_id = ?",
        )
        .bind(&key.identifier)
        .bind(key.class.as_str())
        .bind(key.campaign_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(storage)
    }

    /// Persist `next` for `key`, guarded by the row we read. Returns false
    /// when another writer got there first and the guard no longer matched.
    async fn try_record(
        &self,
        key: &LimiterKey,
        prior: Option<RateLimitRow>,
        next: AttemptWindow,
    ) -> Result<bool, RaffleError> {
        let result = match prior {
            None => {
                sqlx::query(
                    "INSERT INTO rate_limits (identifier, class, campaign_id, attempts, last_attempt) \
                     VALUES (?, ?, ?, ?, ?) \
                     ON CONFLICT(identifier, class, campaign_id) DO NOTHING",
                )
                .bind(&key.identifier)
                .bind(key.class.as_str())
                .bind(key.campaign_id.to_string())
                .bind(i64::from(next.attempts))
                .bind(to_millis(next.last_attempt))
                .execute(self.pool())
                .await
            }
            Some(observed) => {
                sqlx::query(
                    "UPDATE rate_limits SET attempts = ?, last_attempt = ? \
                     WHERE identifier = ? AND class = ? AND campaign_id = ? \
                       AND attempts = ? AND last_attempt = ?",
                )
                .bind(i64::from(next.attempts))
                .bind(to_millis(next.last_attempt))
                .bind(&key.identifier)
                .bind(key.class.as_str())
                .bind(key.campaign_id.to_string())
                .bind(observed.attempts)
                .bind(observed.last_attempt)
                .execute(self.pool())
                .await
            }
        };

        Ok(result.map_err(storage)?.rows_affected() == 1)
    }
}

impl RateLimiter for RaffleDatabase {
    async fn check_and_record(
        &self,
        key: &LimiterKey,
        policy: &RatePolicy,
        now: DateTime<Utc>,
    ) -> Result<Gate, RaffleError> {
        for _ in 0..CAS_RETRIES {
            let prior = self.limiter_row(key).await?;
            let current = prior.map(AttemptWindow::try_from).transpose()?;

            let gate = evaluate(current, policy, now);
            let Gate::Allow { next } = gate else {
                // Denied attempts leave the stored counter untouched
                return Ok(gate);
            };

            if self.try_record(key, prior, next).await? {
                return Ok(gate);
            }
        }

        Err(RaffleError::Storage(format!(
            "rate limiter contention on {} key not resolved after {CAS_RETRIES} retries",
            key.class
        )))
    }
}
