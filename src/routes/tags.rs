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
use crate::extract::Json;
use crate::models::tag::{is_hex_color, is_slug};
use crate::models::Tag;
use crate::AppState;

#[derive(Deserialize)]
pub struct TagForm {
    name: String,
    color: String,
    slug: String,
}

fn validate_tag_form(form: &TagForm) -> BTreeMap<&'static str, String> {
    let mut errors = BTreeMap::new();

    if form.name.trim().is_empty() {
        errors.insert("name", "Name is required".to_string());
    }

    if form.name.chars().count() > 200 {
        errors.insert("name", "Name must be under 200 characters".to_string());
    }

    if !is_hex_color(form.color.trim()) {
        errors.insert("color", "Color must be a hex value like #E26C2D".to_string());
    }

    if !is_slug(form.slug.trim()) || form.slug.chars().count() > 200 {
        errors.insert("slug", "Slug may only contain letters, digits, '-' and '_'".to_string());
    }

    errors
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tags", get(list_tags).post(create_tag))
        .route("/api/tags/{id}", get(show_tag))
}

async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tags: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY name")
        .fetch_all(&state.db)
        .await?;
    Ok(axum::Json(tags))
}

async fn show_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    tag.map(axum::Json).ok_or_else(|| AppError::not_found("Tag"))
}

async fn create_tag(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(form): Json<TagForm>,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&user)?;

    let errors = validate_tag_form(&form);
    if !errors.is_empty() {
        return Err(crate::routes::validation_error(errors));
    }

    let tag = Tag::new(form.name, form.color, form.slug);
    sqlx::query("INSERT INTO tags (id, name, color, slug) VALUES (?, ?, ?, ?)")
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(&tag.slug)
        .execute(&state.db)
        .await?;

    tracing::info!(tag_id = %tag.id, slug = %tag.slug, "tag created");
    Ok((StatusCode::CREATED, axum::Json(tag)))
}
