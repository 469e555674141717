use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::timestamp;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub invite_code: String,
    pub is_staff: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn new(username: String, email: String, first_name: String, last_name: String) -> Self {
        let now = timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            first_name,
            last_name,
            invite_code: Uuid::new_v4().to_string(),
            is_staff: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Authors may change their own resources; staff may change anything.
    pub fn can_modify(&self, owner_id: &str) -> bool {
        self.is_staff || self.id == owner_id
    }
}
