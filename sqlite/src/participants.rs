//! Participant queries.

use crate::db::RaffleDatabase;
use crate::models::{storage, to_millis, ParticipantRow};
use chrono::{DateTime, Utc};
use rifa_core::store::ParticipantStore;
use rifa_core::{NewParticipant, Participant, ParticipantId, RaffleError};

impl RaffleDatabase {
    async fn participant_by_email(&self, email: &str) -> Result<Option<Participant>, RaffleError> {
        sqlx::query_as::<_, ParticipantRow>("SELECT * FROM participants WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(storage)?
            .map(Participant::try_from)
            .transpose()
    }
}

impl ParticipantStore for RaffleDatabase {
    async fn find_or_create_participant(
        &self,
        new: &NewParticipant,
        now: DateTime<Utc>,
    ) -> Result<Participant, RaffleError> {
        if let Some(existing) = self.participant_by_email(&new.email).await? {
            return Ok(existing);
        }

        let candidate = Participant {
            id: ParticipantId::new(),
            name: new.name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            state: new.state.clone(),
            created_at: now,
        };

        // DO NOTHING on the unique email: if a concurrent insert got there
        // first, rows_affected is 0 and we read back the winning row.
        let result = sqlx::query(
            "INSERT INTO participants (id, name, email, phone, state, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(email) DO NOTHING",
        )
        .bind(candidate.id.to_string())
        .bind(&candidate.name)
        .bind(&candidate.email)
        .bind(&candidate.phone)
        .bind(&candidate.state)
        .bind(to_millis(candidate.created_at))
        .execute(self.pool())
        .await
        .map_err(storage)?;

        if result.rows_affected() == 1 {
            return Ok(candidate);
        }

        self.participant_by_email(&new.email)
            .await?
            .ok_or_else(|| RaffleError::Storage("participant insert lost race but row is gone".into()))
    }

    async fn get_participant(&self, id: ParticipantId) -> Result<Option<Participant>, RaffleError> {
        sqlx::query_as::<_, ParticipantRow>("SELECT * FROM participants WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(storage)?
            .map(Participant::try_from)
            .transpose()
    }

    async fn count_participants(&self) -> Result<u64, RaffleError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM participants")
            .fetch_one(self.pool())
            .await
            .map_err(storage)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
