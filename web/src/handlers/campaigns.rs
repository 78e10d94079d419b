//! Campaign management endpoints.

use crate::error::AppError;
use crate::handlers::parse_campaign_id;
use crate::handlers::participate::TicketDto;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rifa_core::store::RaffleStore;
use rifa_core::{
    Campaign, CampaignId, CampaignStatus, NewCampaign, Participant, ParticipantId, RaffleError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

/// A campaign, as rendered to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDto {
    /// Campaign id
    pub id: CampaignId,
    /// Campaign title
    pub title: String,
    /// Prize description
    pub description: String,
    /// Optional prize image URL
    pub image_url: Option<String>,
    /// Ticket price
    pub price: f64,
    /// Scheduled draw date
    pub draw_date: DateTime<Utc>,
    /// Lifecycle state
    pub status: CampaignStatus,
    /// Winning number, present once the campaign is `COMPLETED`
    pub winner_number: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignDto {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.id,
            title: campaign.title,
            description: campaign.description,
            image_url: campaign.image_url,
            price: campaign.price,
            draw_date: campaign.draw_date,
            status: campaign.status,
            winner_number: campaign.winner_number,
            created_at: campaign.created_at,
        }
    }
}

/// A participant, as rendered inside the campaign detail view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    /// Participant id
    pub id: ParticipantId,
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// State/region
    pub state: String,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Participant> for ParticipantDto {
    fn from(participant: Participant) -> Self {
        Self {
            id: participant.id,
            name: participant.name,
            email: participant.email,
            phone: participant.phone,
            state: participant.state,
            created_at: participant.created_at,
        }
    }
}

/// A ticket joined with its holder, for the campaign detail view.
#[derive(Debug, Serialize)]
pub struct TicketDetail {
    /// The ticket fields, inlined
    #[serde(flatten)]
    pub ticket: TicketDto,
    /// The participant holding the ticket
    pub participant: ParticipantDto,
}

/// Campaign detail: the campaign fields plus every issued ticket.
#[derive(Debug, Serialize)]
pub struct CampaignDetailResponse {
    /// The campaign fields, inlined
    #[serde(flatten)]
    pub campaign: CampaignDto,
    /// Tickets issued so far, oldest first, each with its holder
    pub tickets: Vec<TicketDetail>,
}

/// Create/replace payload for a campaign.
///
/// `drawDate` travels as an RFC 3339 string so a malformed date surfaces as
/// a domain validation error rather than a serde rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPayload {
    /// Campaign title
    #[serde(default)]
    pub title: Option<String>,
    /// Prize description
    #[serde(default)]
    pub description: Option<String>,
    /// Optional prize image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Ticket price; must be non-negative
    #[serde(default)]
    pub price: Option<f64>,
    /// Scheduled draw date, RFC 3339
    #[serde(default)]
    pub draw_date: Option<String>,
}

impl CampaignPayload {
    /// Validate the payload into the domain shape.
    fn into_new_campaign(self) -> Result<NewCampaign, AppError> {
        let title = self.title.unwrap_or_default();
        if title.trim().is_empty() {
            return Err(AppError::validation("title is required"));
        }

        let description = self.description.unwrap_or_default();
        if description.trim().is_empty() {
            return Err(AppError::validation("description is required"));
        }

        let price = self
            .price
            .ok_or_else(|| AppError::validation("price is required"))?;
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::validation("price must be a non-negative number"));
        }

        let raw_date = self
            .draw_date
            .ok_or_else(|| AppError::validation("drawDate is required"))?;
        let draw_date = DateTime::parse_from_rfc3339(raw_date.trim())
            .map(|date| date.with_timezone(&Utc))
            .map_err(|_| AppError::validation("drawDate must be an RFC 3339 date-time"))?;

        Ok(NewCampaign {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            image_url: self.image_url.filter(|url| !url.trim().is_empty()),
            price,
            draw_date,
        })
    }
}

/// Response for a successful deletion.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Always `true`; failures go through the error body instead
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// List active campaigns, newest first: `GET /api/campaigns`.
///
/// Completed campaigns drop out of this listing; they stay reachable by id.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list<S>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<CampaignDto>>, AppError>
where
    S: RaffleStore + Clone + Send + Sync + 'static,
{
    let campaigns = state.store.list_active_campaigns().await?;
    Ok(Json(campaigns.into_iter().map(CampaignDto::from).collect()))
}

/// Create a campaign: `POST /api/campaigns`.
///
/// ```bash
/// curl -X POST http://localhost:3000/api/campaigns \
///   -H "Content-Type: application/json" \
///   -d '{
///     "title": "iPhone 16 Pro",
///     "description": "Brand new, 256GB",
///     "price": 10.0,
///     "drawDate": "2025-12-24T20:00:00Z"
///   }'
/// ```
///
/// # Errors
///
/// Returns 400 when the payload fails validation, 500 on storage failure.
pub async fn create<S>(
    State(state): State<AppState<S>>,
    Json(payload): Json<CampaignPayload>,
) -> Result<(StatusCode, Json<CampaignDto>), AppError>
where
    S: RaffleStore + Clone + Send + Sync + 'static,
{
    let new = payload.into_new_campaign()?;
    let campaign = state.store.create_campaign(&new, state.clock.now()).await?;
    info!(campaign_id = %campaign.id, title = %campaign.title, "Campaign created");
    Ok((StatusCode::CREATED, Json(campaign.into())))
}

/// Fetch one campaign with its tickets: `GET /api/campaigns/{id}`.
///
/// Each ticket is joined with its holder. Works for completed campaigns
/// too, which is how a published winner stays auditable.
///
/// # Errors
///
/// Returns 404 when the campaign does not exist, 500 on storage failure.
pub async fn detail<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<CampaignDetailResponse>, AppError>
where
    S: RaffleStore + Clone + Send + Sync + 'static,
{
    let campaign_id = parse_campaign_id(&id)?;
    let campaign = state
        .store
        .get_campaign(campaign_id)
        .await?
        .ok_or(RaffleError::CampaignNotFound)?;
    let tickets = state.store.list_campaign_tickets(campaign_id).await?;

    // One participant often holds several tickets; fetch each holder once.
    let mut holders: HashMap<ParticipantId, Participant> = HashMap::new();
    let mut details = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        let participant = match holders.get(&ticket.participant_id) {
            Some(known) => known.clone(),
            None => {
                let loaded = state
                    .store
                    .get_participant(ticket.participant_id)
                    .await?
                    .ok_or_else(|| {
                        RaffleError::Storage(format!(
                            "ticket {} references a missing participant",
                            ticket.id
                        ))
                    })?;
                holders.insert(ticket.participant_id, loaded.clone());
                loaded
            }
        };
        details.push(TicketDetail {
            ticket: ticket.into(),
            participant: participant.into(),
        });
    }

    Ok(Json(CampaignDetailResponse {
        campaign: campaign.into(),
        tickets: details,
    }))
}

/// Replace the editable fields of a campaign: `PUT /api/campaigns/{id}`.
///
/// # Errors
///
/// Returns 404 when the campaign does not exist, 409 when it is already
/// `COMPLETED` (a drawn record is immutable), 400 on payload validation,
/// 500 on storage failure.
pub async fn update<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(payload): Json<CampaignPayload>,
) -> Result<Json<CampaignDto>, AppError>
where
    S: RaffleStore + Clone + Send + Sync + 'static,
{
    let campaign_id = parse_campaign_id(&id)?;
    let fields = payload.into_new_campaign()?;
    let campaign = state.store.update_campaign(campaign_id, &fields).await?;
    info!(campaign_id = %campaign.id, "Campaign updated");
    Ok(Json(campaign.into()))
}

/// Delete a campaign and everything attached to it:
/// `DELETE /api/campaigns/{id}`.
///
/// Tickets and the campaign's rate counters go with it; participants are
/// global and survive.
///
/// # Errors
///
/// Returns 404 when the campaign does not exist, 500 on storage failure.
pub async fn remove<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError>
where
    S: RaffleStore + Clone + Send + Sync + 'static,
{
    let campaign_id = parse_campaign_id(&id)?;
    state.store.delete_campaign(campaign_id).await?;
    info!(campaign_id = %campaign_id, "Campaign deleted");
    Ok(Json(DeleteResponse { success: true }))
}
