//! Favorites, shopping cart items and subscriptions: unique (user, target)
//! pairs toggled by their owner.

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{RelationRecord, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Favorite,
    ShoppingCart,
    Subscription,
}

impl Relation {
    fn table(self) -> &'static str {
        match self {
            Relation::Favorite => "favorites",
            Relation::ShoppingCart => "shopping_cart",
            Relation::Subscription => "subscriptions",
        }
    }

    fn target_column(self) -> &'static str {
        match self {
            Relation::Favorite | Relation::ShoppingCart => "recipe_id",
            Relation::Subscription => "author_id",
        }
    }

    fn duplicate_message(self) -> &'static str {
        match self {
            Relation::Favorite => "Recipe is already in favorites",
            Relation::ShoppingCart => "Recipe is already in the shopping cart",
            Relation::Subscription => "Already subscribed to this user",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            Relation::Favorite => "Recipe is not in favorites",
            Relation::ShoppingCart => "Recipe is not in the shopping cart",
            Relation::Subscription => "Not subscribed to this user",
        }
    }
}

/// Store the pair. The UNIQUE constraint decides races: the losing insert
/// reports a conflict.
pub async fn add(
    db: &SqlitePool,
    relation: Relation,
    user_id: &str,
    target_id: &str,
) -> Result<RelationRecord, AppError> {
    let record = RelationRecord::new(user_id.to_string(), target_id.to_string());
    let sql = format!(
        "INSERT INTO {} (id, user_id, {}, created_at) VALUES (?, ?, ?, ?)",
        relation.table(),
        relation.target_column()
    );

    let result = sqlx::query(&sql)
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.target_id)
        .bind(&record.created_at)
        .execute(db)
        .await;

    match result.map_err(AppError::from) {
        Ok(_) => {
            tracing::info!(relation = ?relation, user_id, target_id, "relation added");
            Ok(record)
        }
        Err(AppError::Conflict(_)) => {
            Err(AppError::Conflict(relation.duplicate_message().to_string()))
        }
        Err(e) => Err(e),
    }
}

pub async fn remove(
    db: &SqlitePool,
    relation: Relation,
    user_id: &str,
    target_id: &str,
) -> Result<(), AppError> {
    let sql = format!(
        "DELETE FROM {} WHERE user_id = ? AND {} = ?",
        relation.table(),
        relation.target_column()
    );

    let result = sqlx::query(&sql)
        .bind(user_id)
        .bind(target_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(relation.missing_message().to_string()));
    }

    tracing::info!(relation = ?relation, user_id, target_id, "relation removed");
    Ok(())
}

/// Whether `viewer` holds the pair. Always false for anonymous viewers.
pub async fn exists(
    db: &SqlitePool,
    relation: Relation,
    viewer: Option<&User>,
    target_id: &str,
) -> Result<bool, sqlx::Error> {
    let Some(viewer) = viewer else {
        return Ok(false);
    };

    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = ? AND {} = ?)",
        relation.table(),
        relation.target_column()
    );

    let (found,): (bool,) = sqlx::query_as(&sql)
        .bind(&viewer.id)
        .bind(target_id)
        .fetch_one(db)
        .await?;
    Ok(found)
}
