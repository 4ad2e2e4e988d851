//! Database health check.

use async_trait::async_trait;
use sqlx::PgPool;

use domain::repositories::HealthCheckRepository;

/// Checks database connectivity for the readiness endpoint.
#[derive(Clone)]
pub struct HealthCheckRepositoryImpl {
    pool: PgPool,
}

impl HealthCheckRepositoryImpl {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheckRepository for HealthCheckRepositoryImpl {
    /// Runs `SELECT 1` against the pool.
    async fn check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}
