//! User repository for database operations.

use async_trait::async_trait;
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::user::UserFilter;
use domain::models::User;
use domain::repositories::UserRepository;
use domain::DomainResult;

use crate::entities::UserEntity;
use crate::error::db_error;
use crate::metrics::QueryTimer;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepositoryImpl {
    pool: PgPool,
}

impl UserRepositoryImpl {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    /// Insert a user. A taken phone number maps to a conflict.
    async fn create(&self, user: User) -> DomainResult<User> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (id, name, phone_number, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.phone_number)
        .bind(&user.email)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(Into::into).map_err(db_error)
    }

    /// Find a user by id.
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(db_error)?.map(Into::into))
    }

    /// List users ordered by name, filtered by exact phone or name fragment.
    async fn list(&self, filter: &UserFilter, page: PageRequest) -> DomainResult<(Vec<User>, i64)> {
        let timer = QueryTimer::new("list_users");
        let users = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR phone_number = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
            ORDER BY name, created_at
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&filter.phone_number)
        .bind(&filter.name)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM users
            WHERE ($1::text IS NULL OR phone_number = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(&filter.phone_number)
        .bind(&filter.name)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        timer.record();

        Ok((users.into_iter().map(Into::into).collect(), total.0))
    }

    /// Update name and phone number.
    async fn update(&self, user: User) -> DomainResult<Option<User>> {
        let timer = QueryTimer::new("update_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET name = $2, phone_number = $3, email = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.phone_number)
        .bind(&user.email)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_error)?.map(Into::into))
    }

    /// Delete a user. Registrations, seats, host assignments and preferences cascade.
    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(db_error)?.rows_affected() > 0)
    }
}
