use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::auth::{require_staff, AuthUser};
use crate::error::AppError;
use crate::extract::{Json, Query};
use crate::models::Ingredient;
use crate::AppState;

#[derive(Deserialize)]
pub struct IngredientSearch {
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct IngredientForm {
    name: String,
    measurement_unit: String,
}

fn validate_ingredient_form(form: &IngredientForm) -> BTreeMap<&'static str, String> {
    let mut errors = BTreeMap::new();

    if form.name.trim().is_empty() {
        errors.insert("name", "Name is required".to_string());
    } else if form.name.chars().count() > 200 {
        errors.insert("name", "Name must be under 200 characters".to_string());
    }

    if form.measurement_unit.trim().is_empty() {
        errors.insert("measurement_unit", "Measurement unit is required".to_string());
    } else if form.measurement_unit.chars().count() > 200 {
        errors.insert(
            "measurement_unit",
            "Measurement unit must be under 200 characters".to_string(),
        );
    }

    errors
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ingredients", get(list_ingredients).post(create_ingredient))
        .route("/api/ingredients/{id}", get(show_ingredient))
}

/// Catalog listing; `name` narrows to a case-sensitive prefix match.
async fn list_ingredients(
    State(state): State<AppState>,
    Query(search): Query<IngredientSearch>,
) -> Result<impl IntoResponse, AppError> {
    let ingredients: Vec<Ingredient> = match search.name.filter(|n| !n.is_empty()) {
        // LIKE is case-insensitive in SQLite; compare the leading substring instead.
        Some(prefix) => {
            sqlx::query_as(
                "SELECT * FROM ingredients WHERE substr(name, 1, length(?)) = ? ORDER BY name, measurement_unit",
            )
            .bind(&prefix)
            .bind(&prefix)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM ingredients ORDER BY name, measurement_unit")
                .fetch_all(&state.db)
                .await?
        }
    };

    Ok(axum::Json(ingredients))
}

async fn show_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ingredient: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    ingredient
        .map(axum::Json)
        .ok_or_else(|| AppError::not_found("Ingredient"))
}

async fn create_ingredient(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(form): Json<IngredientForm>,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&user)?;

    let errors = validate_ingredient_form(&form);
    if !errors.is_empty() {
        return Err(crate::routes::validation_error(errors));
    }

    let ingredient = Ingredient::new(form.name, form.measurement_unit);
    sqlx::query("INSERT INTO ingredients (id, name, measurement_unit) VALUES (?, ?, ?)")
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(&ingredient.measurement_unit)
        .execute(&state.db)
        .await?;

    tracing::info!(ingredient_id = %ingredient.id, "ingredient created");
    Ok((StatusCode::CREATED, axum::Json(ingredient)))
}
