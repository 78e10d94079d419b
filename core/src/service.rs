//! Raffle use cases: participation admission and draws.

use crate::allocator;
use crate::clock::{Clock, SystemClock};
use crate::error::{RaffleError, Result};
use crate::limiter::{Gate, IdentifierClass, LimiterKey, RatePolicy};
use crate::store::RaffleStore;
use crate::types::{
    Campaign, CampaignId, DrawOutcome, NewParticipant, ParticipationRequest, Ticket,
};
use crate::utils::{is_present, is_valid_email};
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Orchestrates the campaign-facing flows over a storage bundle.
///
/// Admission order is load-bearing:
///
/// 1. payload validation
/// 2. campaign gate (exists and `ACTIVE`) - probing a dead campaign never
///    consumes rate budget
/// 3. IP rate gate - a deny stops here; the email limiter records nothing
/// 4. email rate gate - the IP attempt from step 3 stays recorded
/// 5. participant registry (find-or-create by email)
/// 6. ticket allocation
#[derive(Clone)]
pub struct RaffleService<S> {
    store: S,
    policy: RatePolicy,
    clock: Arc<dyn Clock>,
}

impl<S> RaffleService<S>
where
    S: RaffleStore,
{
    /// Service over `store` with the default policy and the system clock.
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: RatePolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the rate policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the clock (tests inject a manual clock here).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The rate policy in force.
    #[must_use]
    pub const fn policy(&self) -> &RatePolicy {
        &self.policy
    }

    /// Submit a participation request on behalf of `client_ip`.
    ///
    /// # Errors
    ///
    /// * `RaffleError::Validation` - missing/malformed payload field
    /// * `RaffleError::CampaignNotFound` / `CampaignInactive` - campaign gate
    /// * `RaffleError::RateLimited` - one of the two limiter gates denied
    /// * `RaffleError::AllocationExhausted` - no free ticket number found
    /// * `RaffleError::Storage` - backend failure
    pub async fn submit_participation(
        &self,
        request: &ParticipationRequest,
        client_ip: &str,
    ) -> Result<Ticket> {
        validate_participation(request)?;

        let campaign = self
            .store
            .get_campaign(request.campaign_id)
            .await?
            .ok_or(RaffleError::CampaignNotFound)?;
        if !campaign.is_active() {
            return Err(RaffleError::CampaignInactive);
        }

        let email = request.email.trim();
        let now = self.clock.now();
        self.gate(LimiterKey::ip(client_ip, campaign.id), now).await?;
        self.gate(LimiterKey::email(email, campaign.id), now).await?;

        let participant = self
            .store
            .find_or_create_participant(
                &NewParticipant {
                    name: request.name.trim().to_string(),
                    email: email.to_string(),
                    phone: request.phone.trim().to_string(),
                    state: request.state.trim().to_string(),
                },
                now,
            )
            .await?;

        let ticket = allocator::allocate(&self.store, campaign.id, participant.id, now).await?;

        tracing::info!(
            campaign_id = %campaign.id,
            participant_id = %participant.id,
            number = %ticket.number,
            "participation admitted"
        );
        Ok(ticket)
    }

    /// Complete a campaign with a uniformly random winning ticket.
    ///
    /// # Errors
    ///
    /// * `RaffleError::CampaignNotFound` - no such campaign
    /// * `RaffleError::AlreadyDrawn` - campaign already completed
    /// * `RaffleError::NoTickets` - nothing to draw from
    /// * `RaffleError::Storage` - backend failure
    pub async fn draw_automatic(&self, campaign_id: CampaignId) -> Result<DrawOutcome> {
        let campaign = self.active_campaign(campaign_id).await?;

        let tickets = self.store.list_campaign_tickets(campaign.id).await?;
        let winner = tickets
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(RaffleError::NoTickets)?;

        self.finish_draw(campaign.id, &winner.number).await
    }

    /// Complete a campaign with an explicitly chosen winning number.
    ///
    /// # Errors
    ///
    /// * `RaffleError::Validation` - blank winner number
    /// * `RaffleError::CampaignNotFound` - no such campaign
    /// * `RaffleError::AlreadyDrawn` - campaign already completed
    /// * `RaffleError::TicketNotFound` - number matches no ticket in the
    ///   campaign
    /// * `RaffleError::Storage` - backend failure
    pub async fn draw_manual(
        &self,
        campaign_id: CampaignId,
        winner_number: &str,
    ) -> Result<DrawOutcome> {
        let number = winner_number.trim();
        if number.is_empty() {
            return Err(RaffleError::Validation(
                "winnerNumber is required".to_string(),
            ));
        }

        let campaign = self.active_campaign(campaign_id).await?;

        let ticket = self
            .store
            .get_ticket_by_number(campaign.id, number)
            .await?
            .ok_or(RaffleError::TicketNotFound)?;

        self.finish_draw(campaign.id, &ticket.number).await
    }

    /// Run one limiter gate, mapping a deny to `RateLimited`.
    async fn gate(&self, key: LimiterKey, now: chrono::DateTime<chrono::Utc>) -> Result<()> {
        match self.store.check_and_record(&key, &self.policy, now).await? {
            Gate::Allow { .. } => Ok(()),
            Gate::Deny { retry_after_secs } => {
                tracing::warn!(
                    campaign_id = %key.campaign_id,
                    class = %key.class,
                    retry_after_secs,
                    "participation rate limited"
                );
                Err(RaffleError::RateLimited {
                    class: key.class,
                    retry_after_secs,
                })
            }
        }
    }

    /// Load a campaign that must still be `ACTIVE`.
    async fn active_campaign(&self, id: CampaignId) -> Result<Campaign> {
        let campaign = self
            .store
            .get_campaign(id)
            .await?
            .ok_or(RaffleError::CampaignNotFound)?;
        if !campaign.is_active() {
            return Err(RaffleError::AlreadyDrawn);
        }
        Ok(campaign)
    }

    /// Persist the draw transition and assemble the outcome.
    ///
    /// The store re-validates `ACTIVE` inside the write, so a draw that
    /// lost a race surfaces `AlreadyDrawn` here instead of clobbering the
    /// recorded winner.
    async fn finish_draw(&self, id: CampaignId, number: &str) -> Result<DrawOutcome> {
        let campaign = self.store.complete_draw(id, number).await?;
        tracing::info!(campaign_id = %id, winner_number = %number, "campaign drawn");
        Ok(DrawOutcome {
            winner_number: number.to_string(),
            campaign,
        })
    }
}

fn validate_participation(request: &ParticipationRequest) -> Result<()> {
    if !is_present(&request.name) {
        return Err(RaffleError::Validation("name is required".to_string()));
    }
    if !is_valid_email(request.email.trim()) {
        return Err(RaffleError::Validation(
            "a valid email address is required".to_string(),
        ));
    }
    if !is_present(&request.phone) {
        return Err(RaffleError::Validation("phone is required".to_string()));
    }
    if !is_present(&request.state) {
        return Err(RaffleError::Validation("state is required".to_string()));
    }
    Ok(())
}
