//! Draw endpoints: completing a campaign by crowning a winner.
//!
//! Both flavors finish with the same atomic `ACTIVE` → `COMPLETED`
//! transition; they differ only in how the winning number is chosen.

use crate::error::AppError;
use crate::handlers::campaigns::CampaignDto;
use crate::handlers::parse_campaign_id;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use rifa_core::store::RaffleStore;
use rifa_core::DrawOutcome;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a manual draw.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualDrawRequest {
    /// The already-issued ticket number to crown
    #[serde(default)]
    pub winner_number: Option<String>,
}

/// Response for a completed draw.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResponse {
    /// Always `true`; failures go through the error body instead
    pub success: bool,
    /// The winning ticket number
    pub winner_number: String,
    /// The campaign after the transition, winner recorded
    pub campaign: CampaignDto,
}

impl From<DrawOutcome> for DrawResponse {
    fn from(outcome: DrawOutcome) -> Self {
        Self {
            success: true,
            winner_number: outcome.winner_number,
            campaign: outcome.campaign.into(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Draw a random winner: `POST /api/campaigns/{id}/draw-auto`.
///
/// Picks uniformly among the campaign's issued tickets.
///
/// # Errors
///
/// Returns 404 when the campaign does not exist, 400 when no tickets have
/// been sold, 409 when the campaign was already drawn, 500 on storage
/// failure.
pub async fn automatic<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<DrawResponse>, AppError>
where
    S: RaffleStore + Clone + Send + Sync + 'static,
{
    let campaign_id = parse_campaign_id(&id)?;
    let outcome = state.service.draw_automatic(campaign_id).await?;
    Ok(Json(outcome.into()))
}

/// Crown a chosen ticket: `POST /api/campaigns/{id}/draw-manual`.
///
/// ```bash
/// curl -X POST http://localhost:3000/api/campaigns/<id>/draw-manual \
///   -H "Content-Type: application/json" \
///   -d '{"winnerNumber": "483920"}'
/// ```
///
/// # Errors
///
/// Returns 404 when the campaign does not exist or the number was never
/// issued in it, 400 when the number is missing or blank, 409 when the
/// campaign was already drawn, 500 on storage failure.
pub async fn manual<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(request): Json<ManualDrawRequest>,
) -> Result<Json<DrawResponse>, AppError>
where
    S: RaffleStore + Clone + Send + Sync + 'static,
{
    let campaign_id = parse_campaign_id(&id)?;
    let number = request.winner_number.unwrap_or_default();
    let outcome = state.service.draw_manual(campaign_id, &number).await?;
    Ok(Json(outcome.into()))
}
