//! Host assignment repository for database operations.

use async_trait::async_trait;
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::HostAssignment;
use domain::repositories::HostAssignmentRepository;
use domain::{DomainError, DomainResult};

use crate::entities::HostAssignmentEntity;
use crate::error::db_error;
use crate::metrics::QueryTimer;

/// Repository for host assignment database operations.
#[derive(Clone)]
pub struct HostAssignmentRepositoryImpl {
    pool: PgPool,
}

impl HostAssignmentRepositoryImpl {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HostAssignmentRepository for HostAssignmentRepositoryImpl {
    /// Insert an assignment. A repeated host for the event maps to a conflict.
    async fn create(&self, assignment: HostAssignment) -> DomainResult<HostAssignment> {
        let timer = QueryTimer::new("create_host_assignment");
        let result = sqlx::query_as::<_, HostAssignmentEntity>(
            r#"
            INSERT INTO host_assignments (id, event_id, host_user_id, notes, assigned_by,
                                          created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.event_id)
        .bind(assignment.host_user_id)
        .bind(&assignment.notes)
        .bind(assignment.assigned_by)
        .bind(assignment.created_at)
        .bind(assignment.updated_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(Into::into).map_err(db_error)
    }

    /// Find an assignment by id.
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<HostAssignment>> {
        let timer = QueryTimer::new("find_host_assignment_by_id");
        let result = sqlx::query_as::<_, HostAssignmentEntity>(
            "SELECT * FROM host_assignments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_error)?.map(Into::into))
    }

    /// List an event's hosts in assignment order.
    async fn list_by_event(
        &self,
        event_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<(Vec<HostAssignment>, i64)> {
        let timer = QueryTimer::new("list_host_assignments_by_event");
        let entities = sqlx::query_as::<_, HostAssignmentEntity>(
            r#"
            SELECT * FROM host_assignments
            WHERE event_id = $1
            ORDER BY created_at
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(event_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        timer.record();

        let total = self.count_by_event(event_id).await?;
        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// Replace the notes of an assignment.
    async fn update_notes(
        &self,
        id: Uuid,
        notes: Option<String>,
    ) -> DomainResult<Option<HostAssignment>> {
        let timer = QueryTimer::new("update_host_assignment");
        let result = sqlx::query_as::<_, HostAssignmentEntity>(
            r#"
            UPDATE host_assignments
            SET notes = COALESCE($2, notes), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_error)?.map(Into::into))
    }

    /// Delete an assignment unless it is the last one of its event.
    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("delete_host_assignment");
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let event_id: Option<(Uuid,)> =
            sqlx::query_as("SELECT event_id FROM host_assignments WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?;
        let Some((event_id,)) = event_id else {
            return Ok(false);
        };

        // Serializes concurrent removals for the same event.
        sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let remaining: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM host_assignments WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error)?;
        if remaining.0 <= 1 {
            return Err(DomainError::conflict(
                "Cannot remove the last host of an event",
            ));
        }

        let result = sqlx::query("DELETE FROM host_assignments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Count the hosts of an event.
    async fn count_by_event(&self, event_id: Uuid) -> DomainResult<i64> {
        let timer = QueryTimer::new("count_host_assignments_by_event");
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM host_assignments WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;
        timer.record();
        Ok(count.0)
    }
}
