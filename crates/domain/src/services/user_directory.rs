//! User directory service.

use std::sync::Arc;

use shared::pagination::{PageRequest, Paginated};
use tracing::info;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::user::{CreateUserRequest, UpdateUserRequest, UserFilter};
use crate::models::User;
use crate::repositories::UserRepository;

pub struct UserDirectory {
    users: Arc<dyn UserRepository>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn create(&self, request: CreateUserRequest) -> DomainResult<User> {
        let user = self.users.create(User::new(request)).await?;
        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))
    }

    pub async fn list(&self, filter: &UserFilter, page: PageRequest) -> DomainResult<Paginated<User>> {
        let (users, total) = self.users.list(filter, page).await?;
        Ok(Paginated::new(users, total, page))
    }

    pub async fn update(&self, id: Uuid, patch: UpdateUserRequest) -> DomainResult<User> {
        let mut user = self.get(id).await?;
        user.apply(patch);
        let user = self
            .users
            .update(user)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;
        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Deletes the user with their registrations, host assignments,
    /// vehicle arrangements and preferences.
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if !self.users.delete(id).await? {
            return Err(DomainError::not_found("User"));
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }
}
