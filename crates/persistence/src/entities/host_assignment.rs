//! Host assignment entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::HostAssignment;

/// Database row mapping for the host_assignments table.
#[derive(Debug, Clone, FromRow)]
pub struct HostAssignmentEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub host_user_id: Uuid,
    pub notes: Option<String>,
    pub assigned_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HostAssignmentEntity> for HostAssignment {
    fn from(entity: HostAssignmentEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            host_user_id: entity.host_user_id,
            notes: entity.notes,
            assigned_by: entity.assigned_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
