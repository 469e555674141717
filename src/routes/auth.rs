use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::auth::{login_user, logout_user, AuthUser};
use crate::error::AppError;
use crate::extract::Json;
use crate::models::User;
use crate::views::UserView;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    invite_code: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE invite_code = ?")
        .bind(form.invite_code.trim())
        .fetch_optional(&state.db)
        .await?;

    let Some(user) = user else {
        return Err(AppError::Validation("Invalid invite code".to_string()));
    };

    login_user(&session, &user).await?;
    tracing::info!(user_id = %user.id, "user logged in");

    let view = UserView::build(&state.db, user.clone(), Some(&user)).await?;
    Ok(axum::Json(view))
}

async fn logout(session: Session, AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    logout_user(&session).await?;
    tracing::info!(user_id = %user.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}
