//! Host assignment domain model.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A user responsible for hosting an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostAssignment {
    pub id: Uuid,
    pub event_id: Uuid,
    pub host_user_id: Uuid,
    pub notes: Option<String>,
    /// User who made the assignment, if known.
    pub assigned_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HostAssignment {
    pub fn new(
        event_id: Uuid,
        host_user_id: Uuid,
        notes: Option<String>,
        assigned_by: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            event_id,
            host_user_id,
            notes,
            assigned_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request payload for assigning a host to an event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignHostRequest {
    pub host_user_id: Uuid,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,

    pub assigned_by: Option<Uuid>,
}

/// Request payload for assigning several hosts to an event at once.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkAssignHostsRequest {
    #[validate(
        length(min = 1, max = 100, message = "Provide between 1 and 100 host user ids"),
        custom(function = "validate_distinct_hosts")
    )]
    pub host_user_ids: Vec<Uuid>,

    /// Applied to every created assignment.
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,

    pub assigned_by: Option<Uuid>,
}

fn validate_distinct_hosts(ids: &[Uuid]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if ids.iter().all(|id| seen.insert(*id)) {
        Ok(())
    } else {
        let mut err = ValidationError::new("duplicate_host");
        err.message = Some("A host may be listed only once".into());
        Err(err)
    }
}

/// A host that could not be assigned in a bulk request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BulkAssignFailure {
    pub host_user_id: Uuid,
    pub error: String,
}

/// Outcome of a bulk assignment; each host succeeds or fails on its own.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BulkAssignHostsResponse {
    pub assigned: Vec<HostAssignment>,
    pub failed: Vec<BulkAssignFailure>,
}

/// Request payload for updating a host assignment.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateHostAssignmentRequest {
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assignment() {
        let event_id = Uuid::new_v4();
        let host = Uuid::new_v4();
        let assignment = HostAssignment::new(event_id, host, Some("Gate duty".into()), None);
        assert_eq!(assignment.event_id, event_id);
        assert_eq!(assignment.host_user_id, host);
        assert_eq!(assignment.created_at, assignment.updated_at);
    }

    #[test]
    fn test_notes_length() {
        let request = AssignHostRequest {
            host_user_id: Uuid::new_v4(),
            notes: Some("x".repeat(1001)),
            assigned_by: None,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("notes"));
    }

    #[test]
    fn test_bulk_request_rejects_empty_and_duplicates() {
        let host = Uuid::new_v4();
        let request = BulkAssignHostsRequest {
            host_user_ids: vec![host, Uuid::new_v4()],
            notes: None,
            assigned_by: None,
        };
        assert!(request.validate().is_ok());

        let empty = BulkAssignHostsRequest {
            host_user_ids: vec![],
            ..request.clone()
        };
        assert!(empty.validate().is_err());

        let duplicated = BulkAssignHostsRequest {
            host_user_ids: vec![host, host],
            ..request
        };
        let errors = duplicated.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("host_user_ids"));
    }
}
