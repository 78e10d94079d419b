//! Ticket queries.

use crate::db::RaffleDatabase;
use crate::models::{storage, to_millis, TicketRow};
use chrono::{DateTime, Utc};
use rifa_core::store::{TicketInsert, TicketStore};
use rifa_core::{CampaignId, ParticipantId, RaffleError, Ticket, TicketId, TicketStatus};

impl TicketStore for RaffleDatabase {
    async fn insert_ticket(
        &self,
        campaign_id: CampaignId,
        participant_id: ParticipantId,
        number: &str,
        now: DateTime<Utc>,
    ) -> Result<TicketInsert, RaffleError> {
        let ticket = Ticket {
            id: TicketId::new(),
            number: number.to_owned(),
            status: TicketStatus::Sold,
            campaign_id,
            participant_id,
            created_at: now,
        };

        let result = sqlx::query(
            "INSERT INTO tickets (id, number, status, campaign_id, participant_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(ticket.id.to_string())
        .bind(&ticket.number)
        .bind(ticket.status.as_str())
        .bind(ticket.campaign_id.to_string())
        .bind(ticket.participant_id.to_string())
        .bind(to_millis(ticket.created_at))
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(TicketInsert::Created(ticket)),
            Err(e) => {
                // UNIQUE(campaign_id, number) is the conflict authority
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return Ok(TicketInsert::NumberTaken);
                    }
                }
                Err(storage(e))
            }
        }
    }

    async fn number_taken(
        &self,
        campaign_id: CampaignId,
        number: &str,
    ) -> Result<bool, RaffleError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tickets WHERE campaign_id = ? AND number = ?)",
        )
        .bind(campaign_id.to_string())
        .bind(number)
        .fetch_one(self.pool())
        .await
        .map_err(storage)
    }

    async fn get_ticket_by_number(
        &self,
        campaign_id: CampaignId,
        number: &str,
    ) -> Result<Option<Ticket>, RaffleError> {
        sqlx::query_as::<_, TicketRow>(
            "SELECT * FROM tickets WHERE campaign_id = ? AND number = ?",
        )
        .bind(campaign_id.to_string())
        .bind(number)
        .fetch_optional(self.pool())
        .await
        .map_err(storage)?
        .map(Ticket::try_from)
        .transpose()
    }

    async fn list_campaign_tickets(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Ticket>, RaffleError> {
        let rows = sqlx::query_as::<_, TicketRow>(
            "SELECT * FROM tickets WHERE campaign_id = ? ORDER BY created_at ASC, number ASC",
        )
        .bind(campaign_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(storage)?;

        rows.into_iter().map(Ticket::try_from).collect()
    }
}
