//! Response payloads. Every per-requester field is computed from the entity
//! and an explicit `viewer`, never stored.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::models::{Recipe, Tag, User};
use crate::relations::{self, Relation};

#[derive(Debug, Serialize)]
pub struct UserView {
    pub email: String,
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserView {
    pub fn from_parts(user: User, is_subscribed: bool) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }

    pub async fn build(db: &SqlitePool, user: User, viewer: Option<&User>) -> Result<Self, sqlx::Error> {
        let is_subscribed = relations::exists(db, Relation::Subscription, viewer, &user.id).await?;
        Ok(Self::from_parts(user, is_subscribed))
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct RecipeMinified {
    pub id: String,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

impl From<Recipe> for RecipeMinified {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct IngredientAmount {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct RecipeView {
    pub id: String,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<IngredientAmount>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
}

impl RecipeView {
    pub async fn build(db: &SqlitePool, recipe: Recipe, viewer: Option<&User>) -> Result<Self, sqlx::Error> {
        let author: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(&recipe.author_id)
            .fetch_one(db)
            .await?;

        let tags: Vec<Tag> = sqlx::query_as(
            "SELECT t.* FROM tags t JOIN recipe_tags rt ON rt.tag_id = t.id WHERE rt.recipe_id = ? ORDER BY t.name",
        )
        .bind(&recipe.id)
        .fetch_all(db)
        .await?;

        let ingredients: Vec<IngredientAmount> = sqlx::query_as(
            r#"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ?
            ORDER BY i.name
            "#,
        )
        .bind(&recipe.id)
        .fetch_all(db)
        .await?;

        let is_favorited = relations::exists(db, Relation::Favorite, viewer, &recipe.id).await?;
        let is_in_shopping_cart =
            relations::exists(db, Relation::ShoppingCart, viewer, &recipe.id).await?;

        Ok(Self {
            id: recipe.id,
            tags,
            author: UserView::build(db, author, viewer).await?,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        })
    }
}

/// An author as seen from a subscriber's list.
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<RecipeMinified>,
    pub recipes_count: i64,
}

impl SubscriptionView {
    /// `recipes_limit` of `None` includes every recipe.
    pub async fn build(
        db: &SqlitePool,
        author: User,
        viewer: Option<&User>,
        recipes_limit: Option<i64>,
    ) -> Result<Self, sqlx::Error> {
        let (recipes_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = ?")
                .bind(&author.id)
                .fetch_one(db)
                .await?;

        // SQLite treats a negative LIMIT as unbounded.
        let recipes: Vec<RecipeMinified> = sqlx::query_as(
            r#"
            SELECT id, name, image, cooking_time FROM recipes
            WHERE author_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(&author.id)
        .bind(recipes_limit.unwrap_or(-1))
        .fetch_all(db)
        .await?;

        Ok(Self {
            user: UserView::build(db, author, viewer).await?,
            recipes,
            recipes_count,
        })
    }
}
