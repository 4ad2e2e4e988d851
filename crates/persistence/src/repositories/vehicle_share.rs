//! Vehicle share repository for database operations.
//!
//! Every seat change locks the owning event row before the share row, the
//! same order registration changes use, so driver and passenger checks for
//! one event never interleave. Passenger uniqueness per event is also backed
//! by a table constraint.

use async_trait::async_trait;
use shared::pagination::PageRequest;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use domain::models::vehicle_share::VehicleSeatStats;
use domain::models::VehicleShare;
use domain::repositories::VehicleShareRepository;
use domain::{DomainError, DomainResult};

use crate::entities::VehicleShareEntity;
use crate::error::db_error;
use crate::metrics::QueryTimer;

const SELECT_SHARES: &str = r#"
    SELECT s.id, s.event_id, s.driver_user_id, s.capacity, s.notes,
           COALESCE(
               ARRAY_AGG(p.passenger_user_id ORDER BY p.joined_at)
                   FILTER (WHERE p.passenger_user_id IS NOT NULL),
               '{}'
           ) AS passengers,
           s.created_at, s.updated_at
    FROM vehicle_shares s
    LEFT JOIN vehicle_share_passengers p ON p.share_id = s.id
"#;

/// Repository for vehicle share database operations.
#[derive(Clone)]
pub struct VehicleShareRepositoryImpl {
    pool: PgPool,
}

impl VehicleShareRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Locks the event row that serializes vehicle changes for the event.
    async fn lock_event(tx: &mut Transaction<'_, Postgres>, event_id: Uuid) -> DomainResult<()> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error)?;
        row.map(|_| ()).ok_or_else(|| DomainError::not_found("Event"))
    }

    /// Locks the event owning a share and then the share itself.
    async fn lock_event_and_share(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> DomainResult<Option<VehicleShare>> {
        let event_id: Option<(Uuid,)> =
            sqlx::query_as("SELECT event_id FROM vehicle_shares WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(db_error)?;
        let Some((event_id,)) = event_id else {
            return Ok(None);
        };
        Self::lock_event(tx, event_id).await?;
        Self::lock_share(tx, id).await
    }

    /// Locks a share row and loads it with its passengers.
    async fn lock_share(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> DomainResult<Option<VehicleShare>> {
        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM vehicle_shares WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(db_error)?;
        if locked.is_none() {
            return Ok(None);
        }
        let entity = sqlx::query_as::<_, VehicleShareEntity>(&format!(
            "{} WHERE s.id = $1 GROUP BY s.id",
            SELECT_SHARES
        ))
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error)?;
        Ok(Some(entity.into()))
    }

    async fn has_active_registration(
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
        user_id: Uuid,
    ) -> DomainResult<bool> {
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM registrations
                WHERE event_id = $1 AND user_id = $2 AND status <> 'cancelled'
            )
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error)?;
        Ok(row.0)
    }

    /// Whether the user drives or rides in a share of the event other than
    /// `except`.
    async fn in_other_vehicle(
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
        user_id: Uuid,
        except: Option<Uuid>,
    ) -> DomainResult<bool> {
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM vehicle_shares
                WHERE event_id = $1 AND driver_user_id = $2
                  AND ($3::uuid IS NULL OR id <> $3)
            ) OR EXISTS (
                SELECT 1 FROM vehicle_share_passengers
                WHERE event_id = $1 AND passenger_user_id = $2
                  AND ($3::uuid IS NULL OR share_id <> $3)
            )
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(except)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error)?;
        Ok(row.0)
    }
}

#[async_trait]
impl VehicleShareRepository for VehicleShareRepositoryImpl {
    async fn create(&self, share: VehicleShare) -> DomainResult<VehicleShare> {
        let timer = QueryTimer::new("create_vehicle_share");
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        Self::lock_event(&mut tx, share.event_id).await?;

        if !Self::has_active_registration(&mut tx, share.event_id, share.driver_user_id).await? {
            return Err(DomainError::conflict(
                "Driver must hold an active registration for the event",
            ));
        }
        if Self::in_other_vehicle(&mut tx, share.event_id, share.driver_user_id, None).await? {
            return Err(DomainError::conflict(
                "Driver already drives or rides in a vehicle for this event",
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO vehicle_shares (id, event_id, driver_user_id, capacity, notes,
                                        created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(share.id)
        .bind(share.event_id)
        .bind(share.driver_user_id)
        .bind(share.capacity)
        .bind(&share.notes)
        .bind(share.created_at)
        .bind(share.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        timer.record();
        Ok(share)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<VehicleShare>> {
        let timer = QueryTimer::new("find_vehicle_share_by_id");
        let result = sqlx::query_as::<_, VehicleShareEntity>(&format!(
            "{} WHERE s.id = $1 GROUP BY s.id",
            SELECT_SHARES
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_error)?.map(Into::into))
    }

    async fn list_by_event(
        &self,
        event_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<(Vec<VehicleShare>, i64)> {
        let timer = QueryTimer::new("list_vehicle_shares_by_event");
        let entities = sqlx::query_as::<_, VehicleShareEntity>(&format!(
            "{} WHERE s.event_id = $1 GROUP BY s.id ORDER BY s.created_at LIMIT $2 OFFSET $3",
            SELECT_SHARES
        ))
        .bind(event_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM vehicle_shares WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;
        timer.record();

        Ok((entities.into_iter().map(Into::into).collect(), total.0))
    }

    async fn update(
        &self,
        id: Uuid,
        capacity: Option<i32>,
        notes: Option<String>,
    ) -> DomainResult<Option<VehicleShare>> {
        let timer = QueryTimer::new("update_vehicle_share");
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let Some(mut share) = Self::lock_event_and_share(&mut tx, id).await? else {
            return Ok(None);
        };
        if let Some(capacity) = capacity {
            share.check_capacity(capacity)?;
        }

        let updated_at: (chrono::DateTime<chrono::Utc>,) = sqlx::query_as(
            r#"
            UPDATE vehicle_shares
            SET capacity = COALESCE($2, capacity),
                notes = COALESCE($3, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING updated_at
            "#,
        )
        .bind(id)
        .bind(capacity)
        .bind(&notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;
        timer.record();

        if let Some(capacity) = capacity {
            share.capacity = capacity;
        }
        if notes.is_some() {
            share.notes = notes;
        }
        share.updated_at = updated_at.0;
        Ok(Some(share))
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("delete_vehicle_share");
        let result = sqlx::query("DELETE FROM vehicle_shares WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(db_error)?.rows_affected() > 0)
    }

    async fn join(&self, id: Uuid, user_id: Uuid) -> DomainResult<VehicleShare> {
        let timer = QueryTimer::new("join_vehicle_share");
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let mut share = Self::lock_event_and_share(&mut tx, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle share"))?;
        if !Self::has_active_registration(&mut tx, share.event_id, user_id).await? {
            return Err(DomainError::conflict(
                "Passenger must hold an active registration for the event",
            ));
        }
        if Self::in_other_vehicle(&mut tx, share.event_id, user_id, Some(id)).await? {
            return Err(DomainError::conflict(
                "User already drives or rides in another vehicle for this event",
            ));
        }
        share.check_join(user_id)?;

        sqlx::query(
            r#"
            INSERT INTO vehicle_share_passengers (share_id, event_id, passenger_user_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(share.event_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        let updated_at: (chrono::DateTime<chrono::Utc>,) = sqlx::query_as(
            "UPDATE vehicle_shares SET updated_at = NOW() WHERE id = $1 RETURNING updated_at",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        timer.record();

        share.passengers.push(user_id);
        share.updated_at = updated_at.0;
        Ok(share)
    }

    async fn leave(&self, id: Uuid, user_id: Uuid) -> DomainResult<VehicleShare> {
        let timer = QueryTimer::new("leave_vehicle_share");
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let mut share = Self::lock_share(&mut tx, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle share"))?;
        let result = sqlx::query(
            "DELETE FROM vehicle_share_passengers WHERE share_id = $1 AND passenger_user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Passenger"));
        }

        let updated_at: (chrono::DateTime<chrono::Utc>,) = sqlx::query_as(
            "UPDATE vehicle_shares SET updated_at = NOW() WHERE id = $1 RETURNING updated_at",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        timer.record();

        share.passengers.retain(|p| *p != user_id);
        share.updated_at = updated_at.0;
        Ok(share)
    }

    async fn seat_stats(&self, event_id: Uuid) -> DomainResult<VehicleSeatStats> {
        let timer = QueryTimer::new("vehicle_seat_stats");
        let row: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*)::BIGINT,
                   COALESCE(SUM(capacity), 0)::BIGINT,
                   (SELECT COUNT(*) FROM vehicle_share_passengers WHERE event_id = $1)::BIGINT
            FROM vehicle_shares
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        timer.record();

        Ok(VehicleSeatStats {
            share_count: row.0,
            seats_total: row.1,
            seats_taken: row.2,
        })
    }
}
