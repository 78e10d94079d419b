//! Random ticket number allocation.
//!
//! Candidates are drawn uniformly from the six-digit space and offered to
//! the store; the `(campaign, number)` uniqueness guarantee is the
//! authority, so a concurrent winner simply costs one attempt. The search
//! is bounded: a campaign dense enough to eat 100 candidates in a row
//! surfaces [`RaffleError::AllocationExhausted`] instead of spinning.

use crate::error::{RaffleError, Result};
use crate::store::{TicketInsert, TicketStore};
use crate::types::{CampaignId, ParticipantId, Ticket};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Smallest allocatable ticket number.
pub const MIN_NUMBER: u32 = 100_000;
/// Largest allocatable ticket number.
pub const MAX_NUMBER: u32 = 999_999;
/// Candidate attempts before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 100;

/// Draw a random six-digit candidate number.
#[must_use]
pub fn random_candidate() -> String {
    // Scoped so the rng never lives across an await point.
    let number = rand::thread_rng().gen_range(MIN_NUMBER..=MAX_NUMBER);
    number.to_string()
}

/// Allocate a unique ticket number within the campaign.
///
/// Availability is pre-checked as an optimization, but the insert outcome
/// decides: [`TicketInsert::NumberTaken`] from a concurrent winner counts
/// as a failed attempt and the loop continues with a fresh candidate.
///
/// # Errors
///
/// * `RaffleError::AllocationExhausted` - 100 candidates in a row were
///   already taken
/// * `RaffleError::Storage` - backend failure
pub async fn allocate<S: TicketStore>(
    store: &S,
    campaign_id: CampaignId,
    participant_id: ParticipantId,
    now: DateTime<Utc>,
) -> Result<Ticket> {
    for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
        let number = random_candidate();

        if store.number_taken(campaign_id, &number).await? {
            continue;
        }

        match store
            .insert_ticket(campaign_id, participant_id, &number, now)
            .await?
        {
            TicketInsert::Created(ticket) => {
                if attempt > 1 {
                    tracing::debug!(%campaign_id, attempt, "allocated ticket number after collisions");
                }
                return Ok(ticket);
            }
            // Lost the close race; the constraint is the authority
            TicketInsert::NumberTaken => {}
        }
    }

    tracing::warn!(
        %campaign_id,
        attempts = MAX_ALLOCATION_ATTEMPTS,
        "could not find a free ticket number"
    );
    Err(RaffleError::AllocationExhausted)
}
