use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: String,
    pub author_id: String,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Quantity of one ingredient inside one recipe.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeIngredient {
    pub id: String,
    pub recipe_id: String,
    pub ingredient_id: String,
    pub amount: i64,
}

impl RecipeIngredient {
    pub fn new(recipe_id: String, ingredient_id: String, amount: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recipe_id,
            ingredient_id,
            amount,
        }
    }
}

impl Recipe {
    pub fn new(author_id: String, name: String, image: String, text: String, cooking_time: i64) -> Self {
        let now = super::timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            author_id,
            name: clean(name),
            image: clean(image),
            text,
            cooking_time,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Apply the given fields; omitted ones keep their current value.
    pub fn update(
        &mut self,
        name: Option<String>,
        image: Option<String>,
        text: Option<String>,
        cooking_time: Option<i64>,
    ) {
        if let Some(name) = name {
            self.name = clean(name);
        }
        if let Some(image) = image {
            self.image = clean(image);
        }
        if let Some(text) = text {
            self.text = text;
        }
        if let Some(cooking_time) = cooking_time {
            self.cooking_time = cooking_time;
        }
        self.updated_at = super::timestamp();
    }
}

fn clean(value: String) -> String {
    value.trim().to_string()
}
