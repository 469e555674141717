use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::User;
use crate::AppState;

const USER_ID_KEY: &str = "user_id";

/// The signed-in user. Rejects with 401 when the request carries no session.
pub struct AuthUser(pub User);

/// The signed-in user, if any. Read-only endpoints accept anonymous callers.
pub struct MaybeUser(pub Option<User>);

/// The session keeps only the id; the row is loaded fresh so deleted users
/// and revoked staff rights take effect on the next request.
async fn session_user<S>(parts: &mut Parts, state: &S) -> Result<Option<User>, AppError>
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    let Ok(session) = Session::from_request_parts(parts, state).await else {
        return Ok(None);
    };
    let Some(user_id) = session.get::<String>(USER_ID_KEY).await? else {
        return Ok(None);
    };

    let state = AppState::from_ref(state);
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_optional(&state.db)
        .await?;

    if user.is_none() {
        tracing::info!(user_id = %user_id, "session refers to a deleted user");
        session.flush().await?;
    }
    Ok(user)
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts, state)
            .await?
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_user(parts, state).await?))
    }
}

pub async fn login_user(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.insert(USER_ID_KEY, &user.id).await
}

pub async fn logout_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Staff-only guard for catalog writes.
pub fn require_staff(user: &User) -> Result<(), AppError> {
    if user.is_staff {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "You do not have permission to perform this action".to_string(),
        ))
    }
}
