//! Host assignment service.

use std::sync::Arc;

use shared::pagination::{PageRequest, Paginated};
use tracing::info;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::host_assignment::{
    AssignHostRequest, BulkAssignFailure, BulkAssignHostsRequest, BulkAssignHostsResponse,
    UpdateHostAssignmentRequest,
};
use crate::models::HostAssignment;
use crate::repositories::{EventRepository, HostAssignmentRepository, UserRepository};

pub struct HostAssignments {
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
    hosts: Arc<dyn HostAssignmentRepository>,
}

impl HostAssignments {
    pub fn new(
        events: Arc<dyn EventRepository>,
        users: Arc<dyn UserRepository>,
        hosts: Arc<dyn HostAssignmentRepository>,
    ) -> Self {
        Self {
            events,
            users,
            hosts,
        }
    }

    async fn require_event(&self, event_id: Uuid) -> DomainResult<()> {
        match self.events.find_by_id(event_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Event")),
        }
    }

    async fn require_user(&self, user_id: Uuid) -> DomainResult<()> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("User")),
        }
    }

    pub async fn assign(
        &self,
        event_id: Uuid,
        request: AssignHostRequest,
    ) -> DomainResult<HostAssignment> {
        self.require_event(event_id).await?;
        self.require_user(request.host_user_id).await?;
        if let Some(assigned_by) = request.assigned_by {
            self.require_user(assigned_by).await?;
        }

        let assignment = self
            .hosts
            .create(HostAssignment::new(
                event_id,
                request.host_user_id,
                request.notes,
                request.assigned_by,
            ))
            .await?;
        info!(
            assignment_id = %assignment.id,
            event_id = %event_id,
            host_user_id = %assignment.host_user_id,
            "Host assigned"
        );
        Ok(assignment)
    }

    /// Assigns each listed host independently. Hosts that are unknown or
    /// already assigned are reported as failures; storage errors abort.
    pub async fn assign_many(
        &self,
        event_id: Uuid,
        request: BulkAssignHostsRequest,
    ) -> DomainResult<BulkAssignHostsResponse> {
        self.require_event(event_id).await?;
        if let Some(assigned_by) = request.assigned_by {
            self.require_user(assigned_by).await?;
        }

        let mut response = BulkAssignHostsResponse::default();
        for host_user_id in request.host_user_ids {
            let single = AssignHostRequest {
                host_user_id,
                notes: request.notes.clone(),
                assigned_by: request.assigned_by,
            };
            match self.assign(event_id, single).await {
                Ok(assignment) => response.assigned.push(assignment),
                Err(err @ (DomainError::NotFound(_) | DomainError::Conflict(_))) => {
                    response.failed.push(BulkAssignFailure {
                        host_user_id,
                        error: err.to_string(),
                    })
                }
                Err(err) => return Err(err),
            }
        }
        info!(
            event_id = %event_id,
            assigned = response.assigned.len(),
            failed = response.failed.len(),
            "Bulk host assignment finished"
        );
        Ok(response)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<HostAssignment> {
        self.hosts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Host assignment"))
    }

    pub async fn list(
        &self,
        event_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<Paginated<HostAssignment>> {
        self.require_event(event_id).await?;
        let (assignments, total) = self.hosts.list_by_event(event_id, page).await?;
        Ok(Paginated::new(assignments, total, page))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateHostAssignmentRequest,
    ) -> DomainResult<HostAssignment> {
        self.hosts
            .update_notes(id, request.notes)
            .await?
            .ok_or_else(|| DomainError::not_found("Host assignment"))
    }

    /// Removes a host. The last host of an event cannot be removed.
    pub async fn unassign(&self, id: Uuid) -> DomainResult<()> {
        if !self.hosts.delete(id).await? {
            return Err(DomainError::not_found("Host assignment"));
        }
        info!(assignment_id = %id, "Host unassigned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::InMemoryStore;
    use crate::services::test_support::*;

    fn service(store: &Arc<InMemoryStore>) -> HostAssignments {
        HostAssignments::new(store.clone(), store.clone(), store.clone())
    }

    fn request(host_user_id: Uuid) -> AssignHostRequest {
        AssignHostRequest {
            host_user_id,
            notes: None,
            assigned_by: None,
        }
    }

    #[tokio::test]
    async fn test_assign_twice_conflict() {
        let store = store();
        let event = create_event(&store, None).await;
        let host = create_user(&store).await;
        let service = service(&store);

        service.assign(event.id, request(host.id)).await.unwrap();
        let result = service.assign(event.id, request(host.id)).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cannot_unassign_last_host() {
        let store = store();
        let event = create_event(&store, None).await;
        let first = create_user(&store).await;
        let second = create_user(&store).await;
        let service = service(&store);

        let a = service.assign(event.id, request(first.id)).await.unwrap();
        let b = service.assign(event.id, request(second.id)).await.unwrap();

        service.unassign(a.id).await.unwrap();
        let result = service.unassign(b.id).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(service.get(b.id).await.unwrap().host_user_id, second.id);
    }

    #[tokio::test]
    async fn test_assign_unknown_user_or_event() {
        let store = store();
        let event = create_event(&store, None).await;
        let host = create_user(&store).await;
        let service = service(&store);

        assert!(matches!(
            service.assign(event.id, request(Uuid::new_v4())).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            service.assign(Uuid::new_v4(), request(host.id)).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_assign_many_reports_each_host() {
        let store = store();
        let event = create_event(&store, None).await;
        let existing = create_user(&store).await;
        let fresh = create_user(&store).await;
        let service = service(&store);
        service.assign(event.id, request(existing.id)).await.unwrap();

        let missing = Uuid::new_v4();
        let response = service
            .assign_many(
                event.id,
                BulkAssignHostsRequest {
                    host_user_ids: vec![fresh.id, existing.id, missing],
                    notes: Some("Kitchen team".to_string()),
                    assigned_by: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(response.assigned.len(), 1);
        assert_eq!(response.assigned[0].host_user_id, fresh.id);
        assert_eq!(response.assigned[0].notes.as_deref(), Some("Kitchen team"));
        let failed: Vec<Uuid> = response.failed.iter().map(|f| f.host_user_id).collect();
        assert_eq!(failed, vec![existing.id, missing]);

        let page = service.list(event.id, PageRequest::default()).await.unwrap();
        assert_eq!(page.total_count, 2);

        let result = service
            .assign_many(
                Uuid::new_v4(),
                BulkAssignHostsRequest {
                    host_user_ids: vec![fresh.id],
                    notes: None,
                    assigned_by: None,
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_notes() {
        let store = store();
        let event = create_event(&store, None).await;
        let host = create_user(&store).await;
        let service = service(&store);
        let assignment = service.assign(event.id, request(host.id)).await.unwrap();

        let updated = service
            .update(
                assignment.id,
                UpdateHostAssignmentRequest {
                    notes: Some("Handles registrations desk".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("Handles registrations desk"));

        let page = service.list(event.id, PageRequest::default()).await.unwrap();
        assert_eq!(page.total_count, 1);
    }
}
