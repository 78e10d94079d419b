//! Dashboard statistics endpoint.

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use chrono::Duration;
use rifa_core::store::RaffleStore;
use serde::Serialize;

/// How far ahead a draw date counts as "ending soon".
const ENDING_SOON_WINDOW_DAYS: i64 = 7;

/// Aggregate counters for the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// `ACTIVE` campaigns
    pub total_campaigns: u64,
    /// `ACTIVE` campaigns drawing within the next seven days
    pub ending_soon: u64,
    /// Registered participants, across all campaigns
    pub total_participants: u64,
}

/// Aggregate counters: `GET /api/stats`.
///
/// `endingSoon` is computed against the injected clock, so the boundary is
/// testable to the millisecond.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn overview<S>(State(state): State<AppState<S>>) -> Result<Json<StatsResponse>, AppError>
where
    S: RaffleStore + Clone + Send + Sync + 'static,
{
    let now = state.clock.now();
    let horizon = now + Duration::days(ENDING_SOON_WINDOW_DAYS);

    let total_campaigns = state.store.count_active_campaigns().await?;
    let ending_soon = state.store.count_drawing_between(now, horizon).await?;
    let total_participants = state.store.count_participants().await?;

    Ok(Json(StatsResponse {
        total_campaigns,
        ending_soon,
        total_participants,
    }))
}
