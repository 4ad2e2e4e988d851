//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A person known to the system: attendee, host or driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a new user from a validated request.
    pub fn new(request: CreateUserRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            phone_number: request.phone_number,
            email: request.email,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update; absent fields are kept.
    pub fn apply(&mut self, patch: UpdateUserRequest) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(phone_number) = patch.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        self.updated_at = Utc::now();
    }
}

/// Request payload for creating a user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_phone_number"))]
    pub phone_number: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

/// Request payload for updating a user (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone_number"))]
    pub phone_number: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

/// Filters for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Exact phone number match.
    pub phone_number: Option<String>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
}

/// Query parameters for listing users.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub phone_number: Option<String>,
    pub name: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListUsersQuery {
    pub fn filter(&self) -> UserFilter {
        UserFilter {
            phone_number: self.phone_number.clone(),
            name: self.name.clone(),
        }
    }
}
