//! Router configuration for the rifa server.
//!
//! Builds the complete Axum router with all endpoints.

use crate::handlers::{campaigns, draw, health, participate, stats};
use crate::state::AppState;
use axum::routing::{delete, get, post, put};
use axum::Router;
use rifa_core::store::RaffleStore;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// The health probe lives at the root; everything else sits under `/api`.
/// Generic over the storage bundle so the integration tests can run the
/// production router over the in-memory backend.
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: RaffleStore + Clone + Send + Sync + 'static,
{
    let api_routes = Router::new()
        // Public participation
        .route("/participate", post(participate::submit::<S>))
        // Campaign management
        .route("/campaigns", get(campaigns::list::<S>))
        .route("/campaigns", post(campaigns::create::<S>))
        .route("/campaigns/:id", get(campaigns::detail::<S>))
        .route("/campaigns/:id", put(campaigns::update::<S>))
        .route("/campaigns/:id", delete(campaigns::remove::<S>))
        // Draws
        .route("/campaigns/:id/draw-auto", post(draw::automatic::<S>))
        .route("/campaigns/:id/draw-manual", post(draw::manual::<S>))
        // Dashboard
        .route("/stats", get(stats::overview::<S>));

    Router::new()
        // Health check (no /api prefix)
        .route("/health", get(health::health_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
