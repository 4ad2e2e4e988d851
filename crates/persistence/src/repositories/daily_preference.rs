//! Daily preference repository for database operations.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::pagination::PageRequest;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::daily_preference::PreferencePayload;
use domain::models::summary::PreferenceCounts;
use domain::models::DailyPreference;
use domain::repositories::DailyPreferenceRepository;
use domain::DomainResult;

use crate::entities::{DailyPreferenceEntity, UpsertedPreferenceEntity};
use crate::error::db_error;
use crate::metrics::QueryTimer;

/// Repository for daily preference database operations.
#[derive(Clone)]
pub struct DailyPreferenceRepositoryImpl {
    pool: PgPool,
}

impl DailyPreferenceRepositoryImpl {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DailyPreferenceRepository for DailyPreferenceRepositoryImpl {
    /// Insert or replace the record for a user and date. The flag tells whether a row was created.
    async fn upsert(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        preferences: PreferencePayload,
    ) -> DomainResult<(DailyPreference, bool)> {
        let timer = QueryTimer::new("upsert_daily_preference");
        // xmax is zero only for a freshly inserted row version.
        let result = sqlx::query_as::<_, UpsertedPreferenceEntity>(
            r#"
            INSERT INTO daily_preferences (id, user_id, pref_date, preferences)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, pref_date)
            DO UPDATE SET preferences = EXCLUDED.preferences, updated_at = NOW()
            RETURNING id, user_id, pref_date, preferences, created_at, updated_at,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(Json(preferences))
        .fetch_one(&self.pool)
        .await;
        timer.record();

        let row = result.map_err(db_error)?;
        Ok((row.preference.into(), row.inserted))
    }

    /// Find the record for a user and date.
    async fn find(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<Option<DailyPreference>> {
        let timer = QueryTimer::new("find_daily_preference");
        let result = sqlx::query_as::<_, DailyPreferenceEntity>(
            "SELECT * FROM daily_preferences WHERE user_id = $1 AND pref_date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_error)?.map(Into::into))
    }

    /// List a user's records in date order within an optional range.
    async fn list_by_user(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: PageRequest,
    ) -> DomainResult<(Vec<DailyPreference>, i64)> {
        let timer = QueryTimer::new("list_daily_preferences");
        let entities = sqlx::query_as::<_, DailyPreferenceEntity>(
            r#"
            SELECT * FROM daily_preferences
            WHERE user_id = $1
              AND ($2::date IS NULL OR pref_date >= $2)
              AND ($3::date IS NULL OR pref_date <= $3)
            ORDER BY pref_date
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM daily_preferences
            WHERE user_id = $1
              AND ($2::date IS NULL OR pref_date >= $2)
              AND ($3::date IS NULL OR pref_date <= $3)
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        timer.record();

        Ok((entities.into_iter().map(Into::into).collect(), total.0))
    }

    /// Delete the record for a user and date.
    async fn delete(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<bool> {
        let timer = QueryTimer::new("delete_daily_preference");
        let result =
            sqlx::query("DELETE FROM daily_preferences WHERE user_id = $1 AND pref_date = $2")
                .bind(user_id)
                .bind(date)
                .execute(&self.pool)
                .await;
        timer.record();
        Ok(result.map_err(db_error)?.rows_affected() > 0)
    }

    /// Per-date answer counts of attendees holding seats for the event.
    async fn day_counts(
        &self,
        event_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<(NaiveDate, PreferenceCounts)>> {
        let timer = QueryTimer::new("daily_preference_day_counts");
        let rows: Vec<(NaiveDate, i64, i64, i64, i64, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT p.pref_date,
                   COUNT(*)::BIGINT,
                   COUNT(*) FILTER (WHERE (p.preferences->>'staying_with_group')::boolean)::BIGINT,
                   COUNT(*) FILTER (WHERE (p.preferences->>'breakfast_at_host')::boolean)::BIGINT,
                   COUNT(*) FILTER (WHERE (p.preferences->>'lunch_with_group')::boolean)::BIGINT,
                   COUNT(*) FILTER (WHERE (p.preferences->>'dinner_at_host')::boolean)::BIGINT,
                   COUNT(*) FILTER (WHERE p.preferences->>'toilet_preference' = 'indian')::BIGINT,
                   COUNT(*) FILTER (WHERE p.preferences->>'toilet_preference' = 'western')::BIGINT
            FROM daily_preferences p
            JOIN registrations r ON r.user_id = p.user_id
            WHERE r.event_id = $1
              AND r.status IN ('registered', 'confirmed')
              AND p.pref_date BETWEEN $2 AND $3
            GROUP BY p.pref_date
            ORDER BY p.pref_date
            "#,
        )
        .bind(event_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        timer.record();

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.0,
                    PreferenceCounts {
                        respondents: row.1,
                        staying_with_group: row.2,
                        breakfast_at_host: row.3,
                        lunch_with_group: row.4,
                        dinner_at_host: row.5,
                        toilet_indian: row.6,
                        toilet_western: row.7,
                    },
                )
            })
            .collect())
    }
}
