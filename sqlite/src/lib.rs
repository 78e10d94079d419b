//! # Rifa SQLite
//!
//! SQLite persistence for Rifa. [`RaffleDatabase`] wraps a connection pool
//! and implements every `rifa-core` storage trait with runtime-bound
//! queries, so the workspace builds without a database present.
//!
//! Concurrency control lives in the schema and the write shapes:
//!
//! - `participants.email UNIQUE` resolves duplicate registrations
//! - `tickets UNIQUE (campaign_id, number)` is the allocator's conflict
//!   signal
//! - `rate_limits` rows advance through compare-and-swap updates
//! - the draw transition is `UPDATE ... WHERE status = 'ACTIVE'`

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

mod campaigns;
mod db;
mod models;
mod participants;
mod rate_limits;
mod tickets;


pub use db::{DatabaseError, RaffleDatabase};
