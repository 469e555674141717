use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::{AuthUser, MaybeUser};
use crate::error::AppError;
use crate::extract::Query;
use crate::models::User;
use crate::pagination::{Page, PageParams};
use crate::relations::{self, Relation};
use crate::views::{SubscriptionView, UserView};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionParams {
    page: Option<i64>,
    limit: Option<i64>,
    recipes_limit: Option<i64>,
}

impl SubscriptionParams {
    fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }

    fn recipes_limit(&self) -> Result<Option<i64>, AppError> {
        match self.recipes_limit {
            Some(limit) if limit < 0 => Err(AppError::Validation(
                "recipes_limit must not be negative".to_string(),
            )),
            limit => Ok(limit),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/me", get(me))
        .route("/api/users/subscriptions", get(list_subscriptions))
        .route("/api/users/{id}", get(show_user))
        .route(
            "/api/users/{id}/subscribe",
            get(subscribe).post(subscribe).delete(unsubscribe),
        )
}

async fn fetch_user(db: &SqlitePool, id: &str) -> Result<User, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;

    user.ok_or_else(|| AppError::not_found("User"))
}

async fn list_users(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let window = params.window(state.config.page_size)?;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await?;

    let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY username LIMIT ? OFFSET ?")
        .bind(window.limit)
        .bind(window.offset())
        .fetch_all(&state.db)
        .await?;

    let mut results = Vec::with_capacity(users.len());
    for user in users {
        results.push(UserView::build(&state.db, user, viewer.as_ref()).await?);
    }

    Ok(axum::Json(Page::new(results, count, window)))
}

async fn me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let view = UserView::build(&state.db, user.clone(), Some(&user)).await?;
    Ok(axum::Json(view))
}

async fn show_user(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = fetch_user(&state.db, &id).await?;
    let view = UserView::build(&state.db, user, viewer.as_ref()).await?;
    Ok(axum::Json(view))
}

async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Query(params): Query<SubscriptionParams>,
) -> Result<impl IntoResponse, AppError> {
    let recipes_limit = params.recipes_limit()?;
    let author = fetch_user(&state.db, &id).await?;

    if author.id == user.id {
        return Err(AppError::Validation(
            "You cannot subscribe to yourself".to_string(),
        ));
    }

    relations::add(&state.db, Relation::Subscription, &user.id, &author.id).await?;

    let view = SubscriptionView::build(&state.db, author, Some(&user), recipes_limit).await?;
    Ok((StatusCode::CREATED, axum::Json(view)))
}

async fn unsubscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let author = fetch_user(&state.db, &id).await?;
    relations::remove(&state.db, Relation::Subscription, &user.id, &author.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Authors the current user follows, each with a preview of their recipes.
async fn list_subscriptions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<SubscriptionParams>,
) -> Result<impl IntoResponse, AppError> {
    let window = params.page_params().window(state.config.page_size)?;
    let recipes_limit = params.recipes_limit()?;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions WHERE user_id = ?")
        .bind(&user.id)
        .fetch_one(&state.db)
        .await?;

    let authors: Vec<User> = sqlx::query_as(
        r#"
        SELECT u.* FROM users u
        JOIN subscriptions s ON s.author_id = u.id
        WHERE s.user_id = ?
        ORDER BY u.username
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(&user.id)
    .bind(window.limit)
    .bind(window.offset())
    .fetch_all(&state.db)
    .await?;

    let mut results = Vec::with_capacity(authors.len());
    for author in authors {
        results.push(SubscriptionView::build(&state.db, author, Some(&user), recipes_limit).await?);
    }

    Ok(axum::Json(Page::new(results, count, window)))
}
