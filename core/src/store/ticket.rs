//! Ticket storage trait.

use crate::error::Result;
use crate::types::{CampaignId, ParticipantId, Ticket};
use chrono::{DateTime, Utc};

/// Outcome of a ticket insert attempt.
///
/// `NumberTaken` is the authoritative conflict signal from the
/// `(campaign, number)` uniqueness guarantee; the allocator treats it as
/// "pick another number", never as an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TicketInsert {
    /// The number was free; the ticket now exists
    Created(Ticket),
    /// Another ticket in the campaign already holds the number
    NumberTaken,
}

/// Ticket persistence.
pub trait TicketStore: Send + Sync {
    /// Insert a ticket with the given number.
    ///
    /// Must enforce per-campaign number uniqueness atomically: of two
    /// concurrent inserts with the same `(campaign_id, number)`, exactly
    /// one observes `Created` and the other `NumberTaken`.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn insert_ticket(
        &self,
        campaign_id: CampaignId,
        participant_id: ParticipantId,
        number: &str,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<TicketInsert>> + Send;

    /// Whether the number is already taken within the campaign.
    ///
    /// Advisory pre-check for the allocator; correctness rests on
    /// [`TicketStore::insert_ticket`].
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn number_taken(
        &self,
        campaign_id: CampaignId,
        number: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Find a ticket by its number within a campaign.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn get_ticket_by_number(
        &self,
        campaign_id: CampaignId,
        number: &str,
    ) -> impl std::future::Future<Output = Result<Option<Ticket>>> + Send;

    /// All tickets of a campaign, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn list_campaign_tickets(
        &self,
        campaign_id: CampaignId,
    ) -> impl std::future::Future<Output = Result<Vec<Ticket>>> + Send;
}
