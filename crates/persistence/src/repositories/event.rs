//! Event repository for database operations.

use std::collections::HashMap;

use async_trait::async_trait;
use shared::pagination::PageRequest;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use domain::models::event::EventFilter;
use domain::models::{Event, EventDay, HostAssignment};
use domain::repositories::EventRepository;
use domain::DomainResult;

use crate::entities::{EventDayEntity, EventEntity};
use crate::error::db_error;
use crate::metrics::QueryTimer;

/// Repository for event and event day database operations.
#[derive(Clone)]
pub struct EventRepositoryImpl {
    pool: PgPool,
}

impl EventRepositoryImpl {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the days of the given events, grouped by event id.
    async fn days_for(&self, event_ids: &[Uuid]) -> DomainResult<HashMap<Uuid, Vec<EventDay>>> {
        let rows = sqlx::query_as::<_, EventDayEntity>(
            r#"
            SELECT * FROM event_days
            WHERE event_id = ANY($1)
            ORDER BY event_date
            "#,
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut days: HashMap<Uuid, Vec<EventDay>> = HashMap::new();
        for row in rows {
            days.entry(row.event_id).or_default().push(row.into());
        }
        Ok(days)
    }

    /// Inserts event days and host assignments inside the given transaction.
    async fn insert_children(
        tx: &mut Transaction<'_, Postgres>,
        event: &Event,
        hosts: &[HostAssignment],
    ) -> Result<(), sqlx::Error> {
        for day in &event.days {
            sqlx::query(
                r#"
                INSERT INTO event_days (id, event_id, event_date, breakfast_provided,
                                        lunch_provided, dinner_provided, location_name, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(day.id)
            .bind(event.id)
            .bind(day.event_date)
            .bind(day.breakfast_provided)
            .bind(day.lunch_provided)
            .bind(day.dinner_provided)
            .bind(&day.location_name)
            .bind(&day.notes)
            .execute(&mut **tx)
            .await?;
        }
        for host in hosts {
            sqlx::query(
                r#"
                INSERT INTO host_assignments (id, event_id, host_user_id, notes, assigned_by,
                                              created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(host.id)
            .bind(event.id)
            .bind(host.host_user_id)
            .bind(&host.notes)
            .bind(host.assigned_by)
            .bind(host.created_at)
            .bind(host.updated_at)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepository for EventRepositoryImpl {
    /// Inserts the event with its days and initial hosts in one transaction.
    async fn create(&self, event: Event, hosts: Vec<HostAssignment>) -> DomainResult<Event> {
        let timer = QueryTimer::new("create_event");
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let entity = sqlx::query_as::<_, EventEntity>(
            r#"
            INSERT INTO events (id, name, description, location_name, location_map_link,
                                organization, start_date, end_date, registration_start_date,
                                capacity, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.location_name)
        .bind(&event.location_map_link)
        .bind(&event.organization)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.registration_start_date)
        .bind(event.capacity)
        .bind(event.is_active)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        Self::insert_children(&mut tx, &event, &hosts)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;
        timer.record();

        Ok(entity.into_event(event.days))
    }

    /// Find an event by id, with its days.
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Event>> {
        let timer = QueryTimer::new("find_event_by_id");
        let entity = sqlx::query_as::<_, EventEntity>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        let event = match entity {
            Some(entity) => {
                let mut days = self.days_for(&[id]).await?;
                Some(entity.into_event(days.remove(&id).unwrap_or_default()))
            }
            None => None,
        };
        timer.record();
        Ok(event)
    }

    /// List events ordered by start date, then creation time.
    async fn list(
        &self,
        filter: &EventFilter,
        page: PageRequest,
    ) -> DomainResult<(Vec<Event>, i64)> {
        let timer = QueryTimer::new("list_events");
        let entities = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT * FROM events
            WHERE ($1::boolean IS NULL OR is_active = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::date IS NULL OR start_date >= $3)
              AND ($4::date IS NULL OR start_date <= $4)
            ORDER BY start_date, created_at
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.is_active)
        .bind(&filter.name)
        .bind(filter.from)
        .bind(filter.to)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM events
            WHERE ($1::boolean IS NULL OR is_active = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::date IS NULL OR start_date >= $3)
              AND ($4::date IS NULL OR start_date <= $4)
            "#,
        )
        .bind(filter.is_active)
        .bind(&filter.name)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        let ids: Vec<Uuid> = entities.iter().map(|e| e.id).collect();
        let mut days = self.days_for(&ids).await?;
        timer.record();

        let events = entities
            .into_iter()
            .map(|e| {
                let event_days = days.remove(&e.id).unwrap_or_default();
                e.into_event(event_days)
            })
            .collect();
        Ok((events, total.0))
    }

    /// Writes the event row. Days are not touched. Returns `None` when the event is gone.
    async fn update(&self, event: Event) -> DomainResult<Option<Event>> {
        let timer = QueryTimer::new("update_event");
        let entity = sqlx::query_as::<_, EventEntity>(
            r#"
            UPDATE events
            SET name = $2,
                description = $3,
                location_name = $4,
                location_map_link = $5,
                organization = $6,
                start_date = $7,
                end_date = $8,
                registration_start_date = $9,
                capacity = $10,
                is_active = $11,
                updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.location_name)
        .bind(&event.location_map_link)
        .bind(&event.organization)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.registration_start_date)
        .bind(event.capacity)
        .bind(event.is_active)
        .bind(event.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        timer.record();

        Ok(entity.map(|e| e.into_event(event.days)))
    }

    /// Delete an event. Dependents go with it through ON DELETE CASCADE.
    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("delete_event");
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(db_error)?.rows_affected() > 0)
    }
}
