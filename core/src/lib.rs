//! # Rifa Core
//!
//! Domain types, storage traits, and the raffle participation logic.
//!
//! ## Architecture
//!
//! Rifa follows "functional core, imperative shell": every decision the
//! system makes (rate gating, draw validation, ticket candidate bounds) is a
//! pure function over values, while effects (storage, time, randomness at
//! the edges) sit behind narrow traits:
//!
//! - [`store`] — one trait per storage concern ([`store::CampaignStore`],
//!   [`store::ParticipantStore`], [`store::TicketStore`],
//!   [`store::RateLimiter`])
//! - [`clock::Clock`] — injected time, so window arithmetic is deterministic
//!   under test
//! - [`memory::MemoryStore`] — in-process implementation of every trait,
//!   used by tests and usable as a throwaway backend
//!
//! [`service::RaffleService`] orchestrates the use cases: participation
//! admission (campaign gate, per-IP and per-email rate gates, participant
//! registry, ticket allocation) and the two draw flows.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod allocator;
pub mod clock;
pub mod error;
pub mod limiter;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

pub use error::{RaffleError, Result};
pub use limiter::{AttemptWindow, Gate, IdentifierClass, LimiterKey, RatePolicy};
pub use service::RaffleService;
pub use types::{
    Campaign, CampaignId, CampaignStatus, DrawOutcome, NewCampaign, NewParticipant, Participant,
    ParticipantId, ParticipationRequest, Ticket, TicketId, TicketStatus,
};
