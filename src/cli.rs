use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::User;

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

/// Insert a user with a fresh invite code. Duplicate usernames or emails
/// surface as conflicts.
pub async fn create_user(pool: &SqlitePool, new: NewUser) -> Result<User, AppError> {
    let username = new.username.trim().to_string();
    let email = new.email.trim().to_lowercase();

    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation(format!("'{email}' is not an email address")));
    }

    let mut user = User::new(username, email, new.first_name, new.last_name);
    user.is_staff = new.is_staff;

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, first_name, last_name, invite_code, is_staff, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.invite_code)
    .bind(user.is_staff)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(pool)
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user created");
    Ok(user)
}
