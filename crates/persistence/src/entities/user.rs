//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::User;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            phone_number: entity.phone_number,
            email: entity.email,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_entity_to_domain() {
        let entity = UserEntity {
            id: Uuid::new_v4(),
            name: "Meera Iyer".to_string(),
            phone_number: "+919812345678".to_string(),
            email: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let user: User = entity.clone().into();
        assert_eq!(user.id, entity.id);
        assert_eq!(user.phone_number, entity.phone_number);
        assert!(user.email.is_none());
    }
}
