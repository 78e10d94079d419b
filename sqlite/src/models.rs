//! Row structs and conversions into domain types.
//!
//! Timestamps are stored as unix milliseconds so the limiter's ceil
//! arithmetic keeps sub-second precision.

use chrono::{DateTime, Utc};
use rifa_core::limiter::AttemptWindow;
use rifa_core::{
    Campaign, CampaignId, CampaignStatus, Participant, ParticipantId, RaffleError, Ticket,
    TicketId, TicketStatus,
};
use uuid::Uuid;

pub(crate) fn storage(e: sqlx::Error) -> RaffleError {
    RaffleError::Storage(e.to_string())
}

pub(crate) fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

pub(crate) fn from_millis(field: &str, ms: i64) -> Result<DateTime<Utc>, RaffleError> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| corrupt(field, "timestamp out of range"))
}

fn corrupt(field: &str, detail: impl std::fmt::Display) -> RaffleError {
    RaffleError::Storage(format!("corrupt {field}: {detail}"))
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, RaffleError> {
    Uuid::parse_str(value).map_err(|e| corrupt(field, e))
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CampaignRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub price: f64,
    pub draw_date: i64,
    pub status: String,
    pub winner_number: Option<String>,
    pub created_at: i64,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = RaffleError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CampaignId::from_uuid(parse_uuid("campaign id", &row.id)?),
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            price: row.price,
            draw_date: from_millis("campaign draw_date", row.draw_date)?,
            status: CampaignStatus::parse(&row.status)
                .ok_or_else(|| corrupt("campaign status", &row.status))?,
            winner_number: row.winner_number,
            created_at: from_millis("campaign created_at", row.created_at)?,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ParticipantRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub state: String,
    pub created_at: i64,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = RaffleError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ParticipantId::from_uuid(parse_uuid("participant id", &row.id)?),
            name: row.name,
            email: row.email,
            phone: row.phone,
            state: row.state,
            created_at: from_millis("participant created_at", row.created_at)?,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TicketRow {
    pub id: String,
    pub number: String,
    pub status: String,
    pub campaign_id: String,
    pub participant_id: String,
    pub created_at: i64,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = RaffleError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TicketId::from_uuid(parse_uuid("ticket id", &row.id)?),
            number: row.number,
            status: TicketStatus::parse(&row.status)
                .ok_or_else(|| corrupt("ticket status", &row.status))?,
            campaign_id: CampaignId::from_uuid(parse_uuid("ticket campaign_id", &row.campaign_id)?),
            participant_id: ParticipantId::from_uuid(parse_uuid(
                "ticket participant_id",
                &row.participant_id,
            )?),
            created_at: from_millis("ticket created_at", row.created_at)?,
        })
    }
}

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub(crate) struct RateLimitRow {
    pub attempts: i64,
    pub last_attempt: i64,
}

impl TryFrom<RateLimitRow> for AttemptWindow {
    type Error = RaffleError;

    fn try_from(row: RateLimitRow) -> Result<Self, Self::Error> {
        Ok(Self {
            attempts: u32::try_from(row.attempts)
                .map_err(|_| corrupt("rate limit attempts", row.attempts))?,
            last_attempt: from_millis("rate limit last_attempt", row.last_attempt)?,
        })
    }
}
