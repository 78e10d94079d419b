//! Participant registry trait.

use crate::error::Result;
use crate::types::{NewParticipant, Participant, ParticipantId};
use chrono::{DateTime, Utc};

/// Participant persistence, keyed by globally unique email.
pub trait ParticipantStore: Send + Sync {
    /// Look up by email, creating the participant if absent.
    ///
    /// First write wins: when the email already exists, the stored profile
    /// is returned untouched even if `new` carries a different name, phone,
    /// or state. Concurrent duplicate inserts are resolved by the unique
    /// email constraint; the loser re-reads the winner's row.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn find_or_create_participant(
        &self,
        new: &NewParticipant,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Participant>> + Send;

    /// Fetch a participant by id.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn get_participant(
        &self,
        id: ParticipantId,
    ) -> impl std::future::Future<Output = Result<Option<Participant>>> + Send;

    /// Total number of registered participants.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Storage` on backend failure.
    fn count_participants(&self) -> impl std::future::Future<Output = Result<u64>> + Send;
}
