//! Campaign storage trait.

use crate::error::Result;
use crate::types::{Campaign, CampaignId, NewCampaign};
use chrono::{DateTime, Utc};

/// Campaign persistence.
///
/// `complete_draw` is the single mutation that moves a campaign through its
/// lifecycle; everything else is CRUD.
pub trait CampaignStore: Send + Sync {
    /// Create a campaign in `ACTIVE` state.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn create_campaign(
        &self,
        new: &NewCampaign,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Campaign>> + Send;

    /// Fetch a campaign by id.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn get_campaign(
        &self,
        id: CampaignId,
    ) -> impl std::future::Future<Output = Result<Option<Campaign>>> + Send;

    /// All `ACTIVE` campaigns, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn list_active_campaigns(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Campaign>>> + Send;

    /// Replace the editable fields of an `ACTIVE` campaign.
    ///
    /// # Errors
    ///
    /// * `RaffleError::CampaignNotFound` - no such campaign
    /// * `RaffleError::AlreadyDrawn` - campaign is `COMPLETED`; its record
    ///   is immutable
    /// * `RaffleError::Storage` - backend failure
    fn update_campaign(
        &self,
        id: CampaignId,
        fields: &NewCampaign,
    ) -> impl std::future::Future<Output = Result<Campaign>> + Send;

    /// Delete a campaign together with its tickets and rate counters.
    ///
    /// # Errors
    ///
    /// * `RaffleError::CampaignNotFound` - no such campaign
    /// * `RaffleError::Storage` - backend failure
    fn delete_campaign(
        &self,
        id: CampaignId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Atomically transition `ACTIVE` → `COMPLETED` recording the winner.
    ///
    /// This is a conditional write: it must only apply while the campaign
    /// is still `ACTIVE`, so a draw that lost a race can never overwrite a
    /// recorded winner.
    ///
    /// # Errors
    ///
    /// * `RaffleError::AlreadyDrawn` - the campaign was already `COMPLETED`
    /// * `RaffleError::CampaignNotFound` - no such campaign
    /// * `RaffleError::Storage` - backend failure
    fn complete_draw(
        &self,
        id: CampaignId,
        winner_number: &str,
    ) -> impl std::future::Future<Output = Result<Campaign>> + Send;

    /// Count of `ACTIVE` campaigns.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn count_active_campaigns(&self) -> impl std::future::Future<Output = Result<u64>> + Send;

    /// Count of `ACTIVE` campaigns whose draw date falls in `[from, to)`.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn count_drawing_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64>> + Send;
}
