use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::{BTreeMap, HashSet};

use crate::auth::{AuthUser, MaybeUser};
use crate::cart;
use crate::error::AppError;
use crate::extract::Json;
use crate::filter::RecipeQuery;
use crate::models::{Recipe, RecipeIngredient, User};
use crate::pagination::Page;
use crate::relations::{self, Relation};
use crate::routes::validation_error;
use crate::views::{RecipeMinified, RecipeView};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct IngredientInput {
    id: String,
    amount: i64,
}

#[derive(Deserialize)]
pub struct RecipeForm {
    tags: Vec<String>,
    ingredients: Vec<IngredientInput>,
    name: String,
    image: String,
    text: String,
    cooking_time: i64,
}

/// Scalars are optional; the tag and ingredient sets are always replaced.
#[derive(Deserialize)]
pub struct RecipePatch {
    tags: Vec<String>,
    ingredients: Vec<IngredientInput>,
    name: Option<String>,
    image: Option<String>,
    text: Option<String>,
    cooking_time: Option<i64>,
}

fn validate_recipe(
    name: Option<&str>,
    image: Option<&str>,
    text: Option<&str>,
    cooking_time: Option<i64>,
    ingredients: &[IngredientInput],
) -> BTreeMap<&'static str, String> {
    let mut errors = BTreeMap::new();

    if let Some(name) = name {
        if name.trim().is_empty() {
            errors.insert("name", "Name is required".to_string());
        } else if name.chars().count() > 200 {
            errors.insert("name", "Name must be under 200 characters".to_string());
        }
    }

    if image.is_some_and(|image| image.trim().is_empty()) {
        errors.insert("image", "Image is required".to_string());
    }

    if text.is_some_and(|text| text.trim().is_empty()) {
        errors.insert("text", "Text is required".to_string());
    }

    if cooking_time.is_some_and(|minutes| minutes < 1) {
        errors.insert("cooking_time", "Cooking time must be at least 1".to_string());
    }

    if ingredients.iter().any(|i| i.amount < 1) {
        errors.insert("ingredients", "Amount must be at least 1".to_string());
    }

    errors
}

/// The same ingredient twice in one recipe would break the
/// (ingredient, recipe) uniqueness; refuse before touching the database.
fn check_duplicate_ingredients(ingredients: &[IngredientInput]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for ingredient in ingredients {
        if !seen.insert(ingredient.id.as_str()) {
            return Err(AppError::Conflict(format!(
                "Ingredient {} is listed more than once",
                ingredient.id
            )));
        }
    }
    Ok(())
}

fn unique_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

/// Link tags and insert ingredient rows for a recipe. Runs inside the
/// caller's transaction; an unknown id aborts it.
async fn write_components(
    conn: &mut SqliteConnection,
    recipe_id: &str,
    tags: &[String],
    ingredients: &[IngredientInput],
) -> Result<(), AppError> {
    for tag_id in tags {
        let result = sqlx::query(
            "INSERT INTO recipe_tags (recipe_id, tag_id) SELECT ?, id FROM tags WHERE id = ?",
        )
        .bind(recipe_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Validation(format!("Tag {tag_id} does not exist")));
        }
    }

    for input in ingredients {
        let row = RecipeIngredient::new(recipe_id.to_string(), input.id.clone(), input.amount);
        let result = sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (id, recipe_id, ingredient_id, amount)
            SELECT ?, ?, id, ? FROM ingredients WHERE id = ?
            "#,
        )
        .bind(&row.id)
        .bind(&row.recipe_id)
        .bind(row.amount)
        .bind(&row.ingredient_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Validation(format!(
                "Ingredient {} does not exist",
                input.id
            )));
        }
    }

    Ok(())
}

async fn fetch_recipe(db: &SqlitePool, id: &str) -> Result<Recipe, AppError> {
    let recipe: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;

    recipe.ok_or_else(|| AppError::not_found("Recipe"))
}

fn check_owner(user: &User, recipe: &Recipe) -> Result<(), AppError> {
    if user.can_modify(&recipe.author_id) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "Only the author can change this recipe".to_string(),
        ))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route("/api/recipes/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/api/recipes/{id}",
            get(show_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route(
            "/api/recipes/{id}/favorite",
            get(add_favorite).post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            get(add_to_cart).post(add_to_cart).delete(remove_from_cart),
        )
}

async fn list_recipes(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, AppError> {
    let query = RecipeQuery::parse(raw.as_deref())?;
    let window = query.page.window(state.config.page_size)?;
    let viewer = viewer.as_ref();

    let count = query.filter.count(&state.db, viewer).await?;
    let recipes = query.filter.fetch(&state.db, viewer, window).await?;

    let mut results = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        results.push(RecipeView::build(&state.db, recipe, viewer).await?);
    }

    Ok(axum::Json(Page::new(results, count, window)))
}

async fn show_recipe(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = fetch_recipe(&state.db, &id).await?;
    let view = RecipeView::build(&state.db, recipe, viewer.as_ref()).await?;
    Ok(axum::Json(view))
}

async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(form): Json<RecipeForm>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_recipe(
        Some(&form.name),
        Some(&form.image),
        Some(&form.text),
        Some(form.cooking_time),
        &form.ingredients,
    );
    if !errors.is_empty() {
        return Err(validation_error(errors));
    }
    check_duplicate_ingredients(&form.ingredients)?;
    let tags = unique_tags(form.tags);

    let recipe = Recipe::new(
        user.id.clone(),
        form.name,
        form.image,
        form.text,
        form.cooking_time,
    );

    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO recipes (id, author_id, name, image, text, cooking_time, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&recipe.id)
    .bind(&recipe.author_id)
    .bind(&recipe.name)
    .bind(&recipe.image)
    .bind(&recipe.text)
    .bind(recipe.cooking_time)
    .bind(&recipe.created_at)
    .bind(&recipe.updated_at)
    .execute(&mut *tx)
    .await?;

    write_components(&mut tx, &recipe.id, &tags, &form.ingredients).await?;
    tx.commit().await?;

    tracing::info!(recipe_id = %recipe.id, author_id = %user.id, "recipe created");

    let view = RecipeView::build(&state.db, recipe, Some(&user)).await?;
    Ok((StatusCode::CREATED, axum::Json(view)))
}

async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(form): Json<RecipePatch>,
) -> Result<impl IntoResponse, AppError> {
    let mut recipe = fetch_recipe(&state.db, &id).await?;
    check_owner(&user, &recipe)?;

    let errors = validate_recipe(
        form.name.as_deref(),
        form.image.as_deref(),
        form.text.as_deref(),
        form.cooking_time,
        &form.ingredients,
    );
    if !errors.is_empty() {
        return Err(validation_error(errors));
    }
    check_duplicate_ingredients(&form.ingredients)?;
    let tags = unique_tags(form.tags);

    recipe.update(form.name, form.image, form.text, form.cooking_time);

    // Delete-then-recreate of the joins must be all or nothing: the
    // transaction rolls back when dropped before commit.
    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        UPDATE recipes
        SET name = ?, image = ?, text = ?, cooking_time = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&recipe.name)
    .bind(&recipe.image)
    .bind(&recipe.text)
    .bind(recipe.cooking_time)
    .bind(&recipe.updated_at)
    .bind(&recipe.id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(&recipe.id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
        .bind(&recipe.id)
        .execute(&mut *tx)
        .await?;

    write_components(&mut tx, &recipe.id, &tags, &form.ingredients).await?;
    tx.commit().await?;

    tracing::info!(recipe_id = %recipe.id, user_id = %user.id, "recipe updated");

    let view = RecipeView::build(&state.db, recipe, Some(&user)).await?;
    Ok(axum::Json(view))
}

async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = fetch_recipe(&state.db, &id).await?;
    check_owner(&user, &recipe)?;

    sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    tracing::info!(recipe_id = %id, user_id = %user.id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn add_relation(
    state: &AppState,
    relation: Relation,
    user: &User,
    recipe_id: &str,
) -> Result<(StatusCode, axum::Json<RecipeMinified>), AppError> {
    let recipe = fetch_recipe(&state.db, recipe_id).await?;
    relations::add(&state.db, relation, &user.id, &recipe.id).await?;
    Ok((StatusCode::CREATED, axum::Json(RecipeMinified::from(recipe))))
}

async fn remove_relation(
    state: &AppState,
    relation: Relation,
    user: &User,
    recipe_id: &str,
) -> Result<StatusCode, AppError> {
    let recipe = fetch_recipe(&state.db, recipe_id).await?;
    relations::remove(&state.db, relation, &user.id, &recipe.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    add_relation(&state, Relation::Favorite, &user, &id).await
}

async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    remove_relation(&state, Relation::Favorite, &user, &id).await
}

async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    add_relation(&state, Relation::ShoppingCart, &user, &id).await
}

async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    remove_relation(&state, Relation::ShoppingCart, &user, &id).await
}

async fn download_shopping_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let body = cart::shopping_list(&state.db, &user.id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"shopping_cart.txt\""),
    );

    Ok((headers, body))
}
