//! In-memory store implementing every storage trait.
//!
//! Backed by plain maps behind one async mutex; each trait method holds the
//! lock for its whole read-modify-write, which gives the registry, the
//! ticket uniqueness check, the rate limiter, and the draw transition the
//! same atomicity the SQLite backend gets from constraints and conditional
//! writes. Used throughout the test suites and usable as a throwaway
//! backend.

use crate::error::Result;
use crate::limiter::{self, AttemptWindow, Gate, LimiterKey, RatePolicy};
use crate::store::{CampaignStore, ParticipantStore, RateLimiter, TicketInsert, TicketStore};
use crate::types::{
    Campaign, CampaignId, CampaignStatus, NewCampaign, NewParticipant, Participant, ParticipantId,
    Ticket, TicketId, TicketStatus,
};
use crate::RaffleError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    campaigns: HashMap<CampaignId, Campaign>,
    participants: HashMap<ParticipantId, Participant>,
    tickets: HashMap<TicketId, Ticket>,
    rate_limits: HashMap<LimiterKey, AttemptWindow>,
}

/// In-memory implementation of all storage traits.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter state for a limiter key (for tests).
    pub async fn attempt_state(&self, key: &LimiterKey) -> Option<AttemptWindow> {
        self.inner.lock().await.rate_limits.get(key).copied()
    }
}

impl CampaignStore for MemoryStore {
    async fn create_campaign(&self, new: &NewCampaign, now: DateTime<Utc>) -> Result<Campaign> {
        let campaign = Campaign {
            id: CampaignId::new(),
            title: new.title.clone(),
            description: new.description.clone(),
            image_url: new.image_url.clone(),
            price: new.price,
            draw_date: new.draw_date,
            status: CampaignStatus::Active,
            winner_number: None,
            created_at: now,
        };
        self.inner
            .lock()
            .await
            .campaigns
            .insert(campaign.id, campaign.clone());
        Ok(campaign)
    }

    async fn get_campaign(&self, id: CampaignId) -> Result<Option<Campaign>> {
        Ok(self.inner.lock().await.campaigns.get(&id).cloned())
    }

    async fn list_active_campaigns(&self) -> Result<Vec<Campaign>> {
        let inner = self.inner.lock().await;
        let mut campaigns: Vec<Campaign> = inner
            .campaigns
            .values()
            .filter(|c| c.is_active())
            .cloned()
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(campaigns)
    }

    async fn update_campaign(&self, id: CampaignId, fields: &NewCampaign) -> Result<Campaign> {
        let mut inner = self.inner.lock().await;
        let campaign = inner
            .campaigns
            .get_mut(&id)
            .ok_or(RaffleError::CampaignNotFound)?;
        if campaign.status == CampaignStatus::Completed {
            return Err(RaffleError::AlreadyDrawn);
        }
        campaign.title = fields.title.clone();
        campaign.description = fields.description.clone();
        campaign.image_url = fields.image_url.clone();
        campaign.price = fields.price;
        campaign.draw_date = fields.draw_date;
        Ok(campaign.clone())
    }

    async fn delete_campaign(&self, id: CampaignId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.campaigns.remove(&id).is_none() {
            return Err(RaffleError::CampaignNotFound);
        }
        inner.tickets.retain(|_, t| t.campaign_id != id);
        inner.rate_limits.retain(|k, _| k.campaign_id != id);
        Ok(())
    }

    async fn complete_draw(&self, id: CampaignId, winner_number: &str) -> Result<Campaign> {
        let mut inner = self.inner.lock().await;
        let campaign = inner
            .campaigns
            .get_mut(&id)
            .ok_or(RaffleError::CampaignNotFound)?;
        if campaign.status == CampaignStatus::Completed {
            return Err(RaffleError::AlreadyDrawn);
        }
        campaign.status = CampaignStatus::Completed;
        campaign.winner_number = Some(winner_number.to_string());
        Ok(campaign.clone())
    }

    async fn count_active_campaigns(&self) -> Result<u64> {
        let inner = self.inner.lock().await;
        Ok(inner.campaigns.values().filter(|c| c.is_active()).count() as u64)
    }

    async fn count_drawing_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64> {
        let inner = self.inner.lock().await;
        let count = inner
            .campaigns
            .values()
            .filter(|c| c.is_active() && c.draw_date >= from && c.draw_date < to)
            .count();
        Ok(count as u64)
    }
}

impl ParticipantStore for MemoryStore {
    async fn find_or_create_participant(
        &self,
        new: &NewParticipant,
        now: DateTime<Utc>,
    ) -> Result<Participant> {
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner.participants.values().find(|p| p.email == new.email) {
            return Ok(existing.clone());
        }
        let participant = Participant {
            id: ParticipantId::new(),
            name: new.name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            state: new.state.clone(),
            created_at: now,
        };
        inner
            .participants
            .insert(participant.id, participant.clone());
        Ok(participant)
    }

    async fn get_participant(&self, id: ParticipantId) -> Result<Option<Participant>> {
        Ok(self.inner.lock().await.participants.get(&id).cloned())
    }

    async fn count_participants(&self) -> Result<u64> {
        Ok(self.inner.lock().await.participants.len() as u64)
    }
}

impl TicketStore for MemoryStore {
    async fn insert_ticket(
        &self,
        campaign_id: CampaignId,
        participant_id: ParticipantId,
        number: &str,
        now: DateTime<Utc>,
    ) -> Result<TicketInsert> {
        let mut inner = self.inner.lock().await;
        let taken = inner
            .tickets
            .values()
            .any(|t| t.campaign_id == campaign_id && t.number == number);
        if taken {
            return Ok(TicketInsert::NumberTaken);
        }
        let ticket = Ticket {
            id: TicketId::new(),
            number: number.to_string(),
            status: TicketStatus::Sold,
            campaign_id,
            participant_id,
            created_at: now,
        };
        inner.tickets.insert(ticket.id, ticket.clone());
        Ok(TicketInsert::Created(ticket))
    }

    async fn number_taken(&self, campaign_id: CampaignId, number: &str) -> Result<bool> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .values()
            .any(|t| t.campaign_id == campaign_id && t.number == number))
    }

    async fn get_ticket_by_number(
        &self,
        campaign_id: CampaignId,
        number: &str,
    ) -> Result<Option<Ticket>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .values()
            .find(|t| t.campaign_id == campaign_id && t.number == number)
            .cloned())
    }

    async fn list_campaign_tickets(&self, campaign_id: CampaignId) -> Result<Vec<Ticket>> {
        let inner = self.inner.lock().await;
        let mut tickets: Vec<Ticket> = inner
            .tickets
            .values()
            .filter(|t| t.campaign_id == campaign_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.number.cmp(&b.number))
        });
        Ok(tickets)
    }
}

impl RateLimiter for MemoryStore {
    async fn check_and_record(
        &self,
        key: &LimiterKey,
        policy: &RatePolicy,
        now: DateTime<Utc>,
    ) -> Result<Gate> {
        // Read, evaluate, and write under one lock: the whole gate is atomic.
        let mut inner = self.inner.lock().await;
        let gate = limiter::evaluate(inner.rate_limits.get(key).copied(), policy, now);
        if let Gate::Allow { next } = gate {
            inner.rate_limits.insert(key.clone(), next);
        }
        Ok(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().unwrap()
    }

    fn sample_campaign() -> NewCampaign {
        NewCampaign {
            title: "Motorbike raffle".to_string(),
            description: "Win a motorbike".to_string(),
            image_url: None,
            price: 10.0,
            draw_date: now() + Duration::days(30),
        }
    }

    fn sample_participant(email: &str) -> NewParticipant {
        NewParticipant {
            name: "Ana Lima".to_string(),
            email: email.to_string(),
            phone: "11999990000".to_string(),
            state: "SP".to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_or_create_is_first_write_wins() {
        let store = MemoryStore::new();
        let first = store
            .find_or_create_participant(&sample_participant("ana@example.com"), now())
            .await
            .unwrap();

        let mut changed = sample_participant("ana@example.com");
        changed.name = "Someone Else".to_string();
        changed.phone = "11888880000".to_string();
        let second = store
            .find_or_create_participant(&changed, now())
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Ana Lima");
        assert_eq!(store.count_participants().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registrations_share_one_row() {
        let store = MemoryStore::new();
        let new = sample_participant("race@example.com");

        let (a, b, c) = tokio::join!(
            store.find_or_create_participant(&new, now()),
            store.find_or_create_participant(&new, now()),
            store.find_or_create_participant(&new, now()),
        );

        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        assert_eq!(a.id, b.id);
        assert_eq!(b.id, c.id);
        assert_eq!(store.count_participants().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_ticket_number_reports_taken() {
        let store = MemoryStore::new();
        let campaign = store.create_campaign(&sample_campaign(), now()).await.unwrap();
        let participant = store
            .find_or_create_participant(&sample_participant("ana@example.com"), now())
            .await
            .unwrap();

        let first = store
            .insert_ticket(campaign.id, participant.id, "123456", now())
            .await
            .unwrap();
        assert!(matches!(first, TicketInsert::Created(_)));

        let second = store
            .insert_ticket(campaign.id, participant.id, "123456", now())
            .await
            .unwrap();
        assert_eq!(second, TicketInsert::NumberTaken);
    }

    #[tokio::test]
    async fn test_same_number_is_free_in_another_campaign() {
        let store = MemoryStore::new();
        let a = store.create_campaign(&sample_campaign(), now()).await.unwrap();
        let b = store.create_campaign(&sample_campaign(), now()).await.unwrap();
        let participant = store
            .find_or_create_participant(&sample_participant("ana@example.com"), now())
            .await
            .unwrap();

        store
            .insert_ticket(a.id, participant.id, "777777", now())
            .await
            .unwrap();
        let other = store
            .insert_ticket(b.id, participant.id, "777777", now())
            .await
            .unwrap();
        assert!(matches!(other, TicketInsert::Created(_)));
    }

    #[tokio::test]
    async fn test_complete_draw_is_single_shot() {
        let store = MemoryStore::new();
        let campaign = store.create_campaign(&sample_campaign(), now()).await.unwrap();

        let done = store.complete_draw(campaign.id, "123456").await.unwrap();
        assert_eq!(done.status, CampaignStatus::Completed);
        assert_eq!(done.winner_number.as_deref(), Some("123456"));

        let again = store.complete_draw(campaign.id, "654321").await;
        assert_eq!(again, Err(RaffleError::AlreadyDrawn));

        // Winner untouched by the losing attempt
        let stored = store.get_campaign(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.winner_number.as_deref(), Some("123456"));
    }

    #[tokio::test]
    async fn test_update_rejects_completed_campaigns() {
        let store = MemoryStore::new();
        let campaign = store.create_campaign(&sample_campaign(), now()).await.unwrap();
        store.complete_draw(campaign.id, "123456").await.unwrap();

        let result = store.update_campaign(campaign.id, &sample_campaign()).await;
        assert_eq!(result, Err(RaffleError::AlreadyDrawn));
    }

    #[tokio::test]
    async fn test_delete_cascades_tickets_and_counters() {
        let store = MemoryStore::new();
        let campaign = store.create_campaign(&sample_campaign(), now()).await.unwrap();
        let participant = store
            .find_or_create_participant(&sample_participant("ana@example.com"), now())
            .await
            .unwrap();
        store
            .insert_ticket(campaign.id, participant.id, "123456", now())
            .await
            .unwrap();
        let key = LimiterKey::ip("10.0.0.1", campaign.id);
        store
            .check_and_record(&key, &RatePolicy::default(), now())
            .await
            .unwrap();

        store.delete_campaign(campaign.id).await.unwrap();

        assert!(store.get_campaign(campaign.id).await.unwrap().is_none());
        assert!(store
            .list_campaign_tickets(campaign.id)
            .await
            .unwrap()
            .is_empty());
        assert!(store.attempt_state(&key).await.is_none());
        // Participants survive campaign deletion
        assert_eq!(store.count_participants().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_limiter_counter_clamps_at_max_and_denies_write_nothing() {
        let store = MemoryStore::new();
        let campaign = store.create_campaign(&sample_campaign(), now()).await.unwrap();
        let key = LimiterKey::email("ana@example.com", campaign.id);
        let policy = RatePolicy::default();

        for _ in 0..3 {
            let gate = store.check_and_record(&key, &policy, now()).await.unwrap();
            assert!(gate.is_allowed());
        }

        let before = store.attempt_state(&key).await.unwrap();
        assert_eq!(before.attempts, 3);

        // Denied attempts leave the stored state untouched
        let later = now() + Duration::seconds(10);
        let gate = store.check_and_record(&key, &policy, later).await.unwrap();
        assert_eq!(gate, Gate::Deny { retry_after_secs: 50 });
        assert_eq!(store.attempt_state(&key).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_concurrent_burst_admits_exactly_the_max() {
        let store = MemoryStore::new();
        let campaign = store.create_campaign(&sample_campaign(), now()).await.unwrap();
        let key = LimiterKey::ip("203.0.113.9", campaign.id);
        let policy = RatePolicy::default();

        let (a, b, c, d, e) = tokio::join!(
            store.check_and_record(&key, &policy, now()),
            store.check_and_record(&key, &policy, now()),
            store.check_and_record(&key, &policy, now()),
            store.check_and_record(&key, &policy, now()),
            store.check_and_record(&key, &policy, now()),
        );

        let admitted = [a, b, c, d, e]
            .into_iter()
            .filter(|g| g.as_ref().is_ok_and(Gate::is_allowed))
            .count();
        assert_eq!(admitted, 3);
        assert_eq!(store.attempt_state(&key).await.unwrap().attempts, 3);
    }
}
