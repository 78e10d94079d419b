//! Storage traits for the raffle system.
//!
//! One trait per concern. The service depends only on these interfaces;
//! concrete backends (SQLite, in-memory) implement them. Conditional writes
//! inside the stores are the concurrency authority:
//!
//! - the participant registry resolves duplicate-email races through the
//!   unique email constraint
//! - the ticket allocator treats the `(campaign, number)` uniqueness
//!   violation as its retry signal
//! - the rate limiter's read-evaluate-write is atomic per key
//! - the draw transition is a compare-and-set on `ACTIVE`
//!
//! This keeps every invariant enforceable without cross-request locks in
//! the service layer.

mod campaign;
mod participant;
mod rate_limiter;
mod ticket;

pub use campaign::CampaignStore;
pub use participant::ParticipantStore;
pub use rate_limiter::RateLimiter;
pub use ticket::{TicketInsert, TicketStore};

/// Bundle of every storage concern the service needs.
///
/// Blanket-implemented, so any type implementing the four traits qualifies.
pub trait RaffleStore: CampaignStore + ParticipantStore + TicketStore + RateLimiter {}

impl<T> RaffleStore for T where T: CampaignStore + ParticipantStore + TicketStore + RateLimiter {}
