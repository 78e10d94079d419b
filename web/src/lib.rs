//! # Rifa Web
//!
//! Axum HTTP surface for Rifa: the participation and draw endpoints, the
//! campaign management endpoints, the client-IP extractor the rate limiter
//! keys on, and the error-to-response mapping.
//!
//! The binary entry point (`main.rs`) loads [`Config`] from the
//! environment, opens a [`rifa_sqlite::RaffleDatabase`], wraps it in a
//! [`rifa_core::RaffleService`], and serves [`build_router`] over the
//! resulting [`AppState`].

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use extractors::ClientIp;
pub use router::build_router;
pub use state::AppState;
