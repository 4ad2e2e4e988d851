//! Registration repository for database operations.
//!
//! Admission, status changes and cancellation lock the event row so
//! concurrent registration and vehicle changes for one event are evaluated
//! one after another.

use async_trait::async_trait;
use shared::pagination::PageRequest;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use domain::models::registration::{
    admission_status, check_status_transition, NewRegistration, Registration, RegistrationStatus,
    RegistrationType, TransportationMode,
};
use domain::models::summary::RegistrationStats;
use domain::repositories::RegistrationRepository;
use domain::{DomainError, DomainResult};

use crate::entities::RegistrationEntity;
use crate::error::db_error;
use crate::metrics::QueryTimer;

/// Repository for registration-related database operations.
#[derive(Clone)]
pub struct RegistrationRepositoryImpl {
    pool: PgPool,
}

impl RegistrationRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Locks the event row and returns its capacity.
    async fn lock_event(
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
    ) -> DomainResult<Option<i32>> {
        let row: Option<(Option<i32>,)> =
            sqlx::query_as("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(db_error)?;
        row.map(|(capacity,)| capacity)
            .ok_or_else(|| DomainError::not_found("Event"))
    }

    async fn seats_taken(tx: &mut Transaction<'_, Postgres>, event_id: Uuid) -> DomainResult<i64> {
        let seats: (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(number_of_members), 0)::BIGINT
            FROM registrations
            WHERE event_id = $1 AND status IN ('registered', 'confirmed')
            "#,
        )
        .bind(event_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error)?;
        Ok(seats.0)
    }

    /// Cancels inside an open transaction and releases vehicle places.
    ///
    /// The event row is locked first so a concurrent vehicle join cannot
    /// insert a seat after the release below.
    async fn cancel_in(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> DomainResult<Option<RegistrationEntity>> {
        let event_id: Option<(Uuid,)> =
            sqlx::query_as("SELECT event_id FROM registrations WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(db_error)?;
        let Some((event_id,)) = event_id else {
            return Ok(None);
        };
        Self::lock_event(tx, event_id).await?;

        let entity = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            UPDATE registrations
            SET status = 'cancelled',
                updated_at = CASE WHEN status = 'cancelled' THEN updated_at ELSE NOW() END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_error)?;

        let Some(entity) = entity else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM vehicle_shares WHERE event_id = $1 AND driver_user_id = $2")
            .bind(entity.event_id)
            .bind(entity.user_id)
            .execute(&mut **tx)
            .await
            .map_err(db_error)?;
        sqlx::query(
            "DELETE FROM vehicle_share_passengers WHERE event_id = $1 AND passenger_user_id = $2",
        )
        .bind(entity.event_id)
        .bind(entity.user_id)
        .execute(&mut **tx)
        .await
        .map_err(db_error)?;

        Ok(Some(entity))
    }
}

#[async_trait]
impl RegistrationRepository for RegistrationRepositoryImpl {
    async fn register(&self, registration: NewRegistration) -> DomainResult<Registration> {
        let timer = QueryTimer::new("create_registration");
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let capacity = Self::lock_event(&mut tx, registration.event_id).await?;

        let duplicate: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM registrations
                WHERE event_id = $1 AND user_id = $2 AND status <> 'cancelled'
            )
            "#,
        )
        .bind(registration.event_id)
        .bind(registration.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;
        if duplicate.0 {
            return Err(DomainError::conflict(
                "User is already registered for this event",
            ));
        }

        let seats_taken = Self::seats_taken(&mut tx, registration.event_id).await?;
        let status = admission_status(
            capacity,
            seats_taken,
            registration.number_of_members,
            registration.join_waitlist,
        )?;
        let registration = registration.into_registration(status);

        let entity = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            INSERT INTO registrations (id, event_id, user_id, status, registration_type,
                                       number_of_members, transportation_mode, notes,
                                       members, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(registration.id)
        .bind(registration.event_id)
        .bind(registration.user_id)
        .bind(registration.status.as_str())
        .bind(registration.registration_type.as_str())
        .bind(registration.number_of_members)
        .bind(registration.transportation_mode.as_str())
        .bind(&registration.notes)
        .bind(Json(&registration.members))
        .bind(registration.created_at)
        .bind(registration.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        timer.record();
        entity.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Registration>> {
        let timer = QueryTimer::new("find_registration_by_id");
        let entity =
            sqlx::query_as::<_, RegistrationEntity>("SELECT * FROM registrations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        timer.record();
        entity.map(TryInto::try_into).transpose()
    }

    async fn find_active(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> DomainResult<Option<Registration>> {
        let timer = QueryTimer::new("find_active_registration");
        let entity = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            SELECT * FROM registrations
            WHERE event_id = $1 AND user_id = $2 AND status <> 'cancelled'
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        timer.record();
        entity.map(TryInto::try_into).transpose()
    }

    async fn find_active_by_member_phone(
        &self,
        event_id: Uuid,
        phone_number: &str,
    ) -> DomainResult<Option<Registration>> {
        let timer = QueryTimer::new("find_registration_by_member_phone");
        let entity = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            SELECT * FROM registrations
            WHERE event_id = $1 AND status <> 'cancelled'
              AND members @> jsonb_build_array(jsonb_build_object('phone_number', $2::text))
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(event_id)
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        timer.record();
        entity.map(TryInto::try_into).transpose()
    }

    async fn list_by_event(
        &self,
        event_id: Uuid,
        status: Option<RegistrationStatus>,
        page: PageRequest,
    ) -> DomainResult<(Vec<Registration>, i64)> {
        let timer = QueryTimer::new("list_registrations_by_event");
        let status = status.map(|s| s.as_str());
        let entities = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            SELECT * FROM registrations
            WHERE event_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(event_id)
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM registrations
            WHERE event_id = $1 AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(event_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        timer.record();

        let registrations = entities
            .into_iter()
            .map(TryInto::try_into)
            .collect::<DomainResult<Vec<Registration>>>()?;
        Ok((registrations, total.0))
    }

    async fn cancel(&self, id: Uuid) -> DomainResult<Option<Registration>> {
        let timer = QueryTimer::new("cancel_registration");
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let entity = Self::cancel_in(&mut tx, id).await?;
        tx.commit().await.map_err(db_error)?;
        timer.record();
        entity.map(TryInto::try_into).transpose()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> DomainResult<Option<Registration>> {
        let timer = QueryTimer::new("update_registration_status");
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        if status == RegistrationStatus::Cancelled {
            let entity = Self::cancel_in(&mut tx, id).await?;
            tx.commit().await.map_err(db_error)?;
            timer.record();
            return entity.map(TryInto::try_into).transpose();
        }

        let event_id: Option<(Uuid,)> =
            sqlx::query_as("SELECT event_id FROM registrations WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?;
        let Some((event_id,)) = event_id else {
            return Ok(None);
        };
        let capacity = Self::lock_event(&mut tx, event_id).await?;

        let current: Registration = sqlx::query_as::<_, RegistrationEntity>(
            "SELECT * FROM registrations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?
        .try_into()?;

        if check_status_transition(current.status, status)? {
            let seats_taken = Self::seats_taken(&mut tx, event_id).await? - current.seats();
            admission_status(capacity, seats_taken, current.number_of_members, false)?;
        }

        let entity = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            UPDATE registrations
            SET status = $2,
                updated_at = CASE WHEN status = $2 THEN updated_at ELSE NOW() END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        timer.record();
        entity.try_into().map(Some)
    }

    async fn stats(&self, event_id: Uuid) -> DomainResult<RegistrationStats> {
        let timer = QueryTimer::new("registration_stats");
        let rows: Vec<(String, String, String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT status, registration_type, transportation_mode,
                   COUNT(*)::BIGINT, COALESCE(SUM(number_of_members), 0)::BIGINT
            FROM registrations
            WHERE event_id = $1
            GROUP BY status, registration_type, transportation_mode
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        timer.record();

        let unknown = |column: &str, value: &str| {
            DomainError::Storage(format!("unknown {} '{}' in registrations", column, value))
        };
        let mut stats = RegistrationStats::default();
        for (status, registration_type, mode, count, members) in rows {
            let status =
                RegistrationStatus::parse(&status).ok_or_else(|| unknown("status", &status))?;
            stats.counts.add(status, count);
            if status.occupies_seats() {
                stats.seats_taken += members;
            }
            if status != RegistrationStatus::Cancelled {
                let registration_type = RegistrationType::parse(&registration_type)
                    .ok_or_else(|| unknown("registration_type", &registration_type))?;
                let mode = TransportationMode::parse(&mode)
                    .ok_or_else(|| unknown("transportation_mode", &mode))?;
                stats.by_type.add(registration_type, count);
                stats.by_transport.add(mode, count);
            }
        }
        Ok(stats)
    }
}
