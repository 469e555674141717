use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::timestamp;

/// A stored (user, target) pair: a favorite, a cart item or a subscription.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RelationRecord {
    pub id: String,
    pub user_id: String,
    pub target_id: String,
    pub created_at: String,
}

impl RelationRecord {
    pub fn new(user_id: String, target_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            target_id,
            created_at: timestamp(),
        }
    }
}
