use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::user::User;

pub async fn find_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Inserts a user whose password has already been hashed.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    hashed_password: &str,
) -> Result<User, sqlx::Error> {
    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, hashed_password)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(hashed_password)
    .fetch_one(pool)
    .await?;

    info!("Created user {} ({})", user.username, user.id);
    Ok(user)
}
