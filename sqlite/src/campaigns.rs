//! Campaign queries.

use crate::db::RaffleDatabase;
use crate::models::{storage, to_millis, CampaignRow};
use chrono::{DateTime, Utc};
use rifa_core::store::CampaignStore;
use rifa_core::{Campaign, CampaignId, CampaignStatus, NewCampaign, RaffleError};

impl RaffleDatabase {
    async fn campaign_row(&self, id: CampaignId) -> Result<Option<CampaignRow>, RaffleError> {
        sqlx::query_as::<_, CampaignRow>("SELECT * FROM campaigns WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(storage)
    }

    async fn count_where(
        &self,
        sql: &str,
        binds: &[i64],
    ) -> Result<u64, RaffleError> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let count = query.fetch_one(self.pool()).await.map_err(storage)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

impl CampaignStore for RaffleDatabase {
    async fn create_campaign(
        &self,
        new: &NewCampaign,
        now: DateTime<Utc>,
    ) -> Result<Campaign, RaffleError> {
        let campaign = Campaign {
            id: CampaignId::new(),
            title: new.title.clone(),
            description: new.description.clone(),
            image_url: new.image_url.clone(),
            price: new.price,
            draw_date: new.draw_date,
            status: CampaignStatus::Active,
            winner_number: None,
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO campaigns (id, title, description, image_url, price, draw_date, status, winner_number, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?)",
        )
        .bind(campaign.id.to_string())
        .bind(&campaign.title)
        .bind(&campaign.description)
        .bind(&campaign.image_url)
        .bind(campaign.price)
        .bind(to_millis(campaign.draw_date))
        .bind(campaign.status.as_str())
        .bind(to_millis(campaign.created_at))
        .execute(self.pool())
        .await
        .map_err(storage)?;

        Ok(campaign)
    }

    async fn get_campaign(&self, id: CampaignId) -> Result<Option<Campaign>, RaffleError> {
        self.campaign_row(id).await?.map(Campaign::try_from).transpose()
    }

    async fn list_active_campaigns(&self) -> Result<Vec<Campaign>, RaffleError> {
        let rows = sqlx::query_as::<_, CampaignRow>(
            "SELECT * FROM campaigns WHERE status = 'ACTIVE' ORDER BY created_at DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(storage)?;

        rows.into_iter().map(Campaign::try_from).collect()
    }

    async fn update_campaign(
        &self,
        id: CampaignId,
        fields: &NewCampaign,
    ) -> Result<Campaign, RaffleError> {
        // Conditional on ACTIVE: a completed campaign's record is immutable
        let result = sqlx::query(
            "UPDATE campaigns SET title = ?, description = ?, image_url = ?, price = ?, draw_date = ? \
             WHERE id = ? AND status = 'ACTIVE'",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .bind(fields.price)
        .bind(to_millis(fields.draw_date))
        .bind(id.to_string())
        .execute(self.pool())
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return match self.get_campaign(id).await? {
                None => Err(RaffleError::CampaignNotFound),
                Some(_) => Err(RaffleError::AlreadyDrawn),
            };
        }

        self.get_campaign(id).await?.ok_or(RaffleError::CampaignNotFound)
    }

    async fn delete_campaign(&self, id: CampaignId) -> Result<(), RaffleError> {
        // Tickets and rate counters go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM campaigns WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(RaffleError::CampaignNotFound);
        }
        Ok(())
    }

    async fn complete_draw(
        &self,
        id: CampaignId,
        winner_number: &str,
    ) -> Result<Campaign, RaffleError> {
        // Conditional write: only an ACTIVE campaign can transition, so a
        // racing draw cannot overwrite the recorded winner.
        let result = sqlx::query(
            "UPDATE campaigns SET status = 'COMPLETED', winner_number = ? \
             WHERE id = ? AND status = 'ACTIVE'",
        )
        .bind(winner_number)
        .bind(id.to_string())
        .execute(self.pool())
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return match self.get_campaign(id).await? {
                None => Err(RaffleError::CampaignNotFound),
                Some(_) => Err(RaffleError::AlreadyDrawn),
            };
        }

        self.get_campaign(id).await?.ok_or(RaffleError::CampaignNotFound)
    }

    async fn count_active_campaigns(&self) -> Result<u64, RaffleError> {
        self.count_where("SELECT COUNT(*) FROM campaigns WHERE status = 'ACTIVE'", &[])
            .await
    }

    async fn count_drawing_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, RaffleError> {
        self.count_where(
            "SELECT COUNT(*) FROM campaigns WHERE status = 'ACTIVE' AND draw_date >= ? AND draw_date < ?",
            &[to_millis(from), to_millis(to)],
        )
        .await
    }
}
