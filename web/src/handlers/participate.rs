//! Public participation endpoint.
//!
//! The one route exposed to end users. Everything else under `/api` is
//! campaign management.

use crate::error::AppError;
use crate::extractors::ClientIp;
use crate::handlers::parse_campaign_id;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use rifa_core::store::RaffleStore;
use rifa_core::{CampaignId, ParticipantId, ParticipationRequest, Ticket, TicketId, TicketStatus};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for entering a campaign.
///
/// Every field is optional at the serde layer; presence is enforced by the
/// domain validation so a missing field and a blank field produce the same
/// 400 response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipateRequest {
    /// Id of the campaign to enter
    #[serde(default)]
    pub campaign_id: Option<String>,
    /// Participant full name
    #[serde(default)]
    pub name: Option<String>,
    /// Participant email; one identity per address
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Participant state/region
    #[serde(default)]
    pub state: Option<String>,
}

/// An allocated ticket, as rendered to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDto {
    /// Ticket id
    pub id: TicketId,
    /// Six-digit ticket number, unique within the campaign
    pub number: String,
    /// Sale state
    pub status: TicketStatus,
    /// Campaign the ticket belongs to
    pub campaign_id: CampaignId,
    /// Participant holding the ticket
    pub participant_id: ParticipantId,
    /// Allocation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Ticket> for TicketDto {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            number: ticket.number,
            status: ticket.status,
            campaign_id: ticket.campaign_id,
            participant_id: ticket.participant_id,
            created_at: ticket.created_at,
        }
    }
}

/// Response for a confirmed participation.
#[derive(Debug, Serialize)]
pub struct ParticipateResponse {
    /// Always `true`; failures go through the error body instead
    pub success: bool,
    /// The ticket that was allocated
    pub ticket: TicketDto,
    /// Human-readable confirmation carrying the ticket number
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Enter a campaign: `POST /api/participate`.
///
/// Runs the admission sequence (payload validation, campaign gate, per-IP
/// and per-email rate gates, participant registry, ticket allocation) and
/// returns the allocated ticket.
///
/// ```bash
/// curl -X POST http://localhost:3000/api/participate \
///   -H "Content-Type: application/json" \
///   -d '{
///     "campaignId": "0b8f3b54-4f6e-4d88-9aef-3c2b9a1d4e22",
///     "name": "Maria Silva",
///     "email": "maria@example.com",
///     "phone": "+55 11 91234-5678",
///     "state": "SP"
///   }'
/// ```
///
/// # Errors
///
/// - 404 if the campaign does not exist or is no longer active
/// - 429 if the IP or email gate denies, with the retry delay in the message
/// - 400 if a payload field is missing, blank, or malformed
/// - 500 if ticket allocation exhausts its attempts
pub async fn submit<S>(
    State(state): State<AppState<S>>,
    client_ip: ClientIp,
    Json(request): Json<ParticipateRequest>,
) -> Result<Json<ParticipateResponse>, AppError>
where
    S: RaffleStore + Clone + Send + Sync + 'static,
{
    let campaign_id = match request.campaign_id.as_deref() {
        None => return Err(AppError::validation("campaignId is required")),
        Some(raw) => parse_campaign_id(raw)?,
    };

    let request = ParticipationRequest {
        campaign_id,
        name: request.name.unwrap_or_default(),
        email: request.email.unwrap_or_default(),
        phone: request.phone.unwrap_or_default(),
        state: request.state.unwrap_or_default(),
    };

    let ticket = state
        .service
        .submit_participation(&request, &client_ip.0)
        .await?;

    let message = format!(
        "Participation confirmed! Your number is {}.",
        ticket.number
    );

    Ok(Json(ParticipateResponse {
        success: true,
        ticket: ticket.into(),
        message,
    }))
}
