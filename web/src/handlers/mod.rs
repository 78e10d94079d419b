//! HTTP handlers, organized by resource.
//!
//! - [`participate`] — the public participation endpoint
//! - [`draw`] — automatic and manual draws
//! - [`campaigns`] — campaign management
//! - [`stats`] — dashboard statistics
//! - [`health`] — liveness probe

pub mod campaigns;
pub mod draw;
pub mod health;
pub mod participate;
pub mod stats;

use crate::error::AppError;
use rifa_core::{CampaignId, RaffleError};
use uuid::Uuid;

/// Resolve a client-supplied campaign id.
///
/// Ids are opaque to clients, so a string that does not parse is
/// indistinguishable from an id that was never issued: both are a 404.
pub(crate) fn parse_campaign_id(raw: &str) -> Result<CampaignId, AppError> {
    Uuid::parse_str(raw.trim())
        .map(CampaignId::from_uuid)
        .map_err(|_| AppError::from(RaffleError::CampaignNotFound))
}
