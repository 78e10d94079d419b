//! Error types for raffle operations.

use crate::limiter::IdentifierClass;
use thiserror::Error;

/// Result type alias for raffle operations.
pub type Result<T> = std::result::Result<T, RaffleError>;

/// Error taxonomy for the raffle system.
///
/// Variants are organized by category; `Display` strings are the stable
/// user-facing texts surfaced by the HTTP layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RaffleError {
    // ═══════════════════════════════════════════════════════════
    // Campaign Errors
    // ═══════════════════════════════════════════════════════════

    /// No campaign exists with the requested id.
    #[error("Campaign not found")]
    CampaignNotFound,

    /// Participation was submitted to a campaign that is no longer active.
    #[error("Campaign not found or inactive")]
    CampaignInactive,

    /// A draw was attempted on a campaign whose draw already completed.
    #[error("This campaign has already been drawn")]
    AlreadyDrawn,

    /// An automatic draw was attempted on a campaign with zero tickets.
    #[error("No tickets have been sold for this campaign")]
    NoTickets,

    // ═══════════════════════════════════════════════════════════
    // Ticket Errors
    // ═══════════════════════════════════════════════════════════

    /// A manual draw named a number that matches no ticket in the campaign.
    #[error("Ticket number not found in this campaign")]
    TicketNotFound,

    /// One hundred candidate numbers in a row were already taken.
    #[error("Could not allocate a unique ticket number")]
    AllocationExhausted,

    // ═══════════════════════════════════════════════════════════
    // Admission Errors
    // ═══════════════════════════════════════════════════════════

    /// The rate limiter denied the attempt.
    #[error("{}", rate_limited_message(.class, .retry_after_secs))]
    RateLimited {
        /// Which identifier class tripped the limit
        class: IdentifierClass,
        /// Whole seconds until the window frees up (always >= 1)
        retry_after_secs: u32,
    },

    /// A request field was missing or malformed.
    #[error("{0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Storage backend failure. The detail is logged; users see a generic
    /// message.
    #[error("Storage error: {0}")]
    Storage(String),
}

fn rate_limited_message(class: &IdentifierClass, retry_after_secs: &u32) -> String {
    match class {
        IdentifierClass::Ip => format!(
            "Too many attempts. Please wait {retry_after_secs} seconds before trying again."
        ),
        IdentifierClass::Email => format!(
            "This email was used too many times. Please wait {retry_after_secs} seconds before trying again."
        ),
    }
}

impl RaffleError {
    /// Returns `true` if this error is an expected consequence of user
    /// input rather than a system fault.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rifa_core::RaffleError;
    /// assert!(RaffleError::CampaignNotFound.is_user_error());
    /// assert!(!RaffleError::AllocationExhausted.is_user_error());
    /// ```
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::CampaignNotFound
                | Self::CampaignInactive
                | Self::AlreadyDrawn
                | Self::NoTickets
                | Self::TicketNotFound
                | Self::RateLimited { .. }
                | Self::Validation(_)
        )
    }

    /// Returns `true` for limiter denials.
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
