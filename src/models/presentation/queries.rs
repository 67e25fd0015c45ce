use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use super::types::*;

/// Insert a presentation and return the stored row.
pub async fn create(pool: &PgPool, title: &str) -> Result<Presentation, AppError> {
    let presentation = sqlx::query_as::<_, Presentation>(
        "INSERT INTO presentations (title) VALUES ($1) \
         RETURNING id, title, created_at",
    )
    .bind(title)
    .fetch_one(pool)
    .await?;

    Ok(presentation)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Presentation>, AppError> {
    let presentation = sqlx::query_as::<_, Presentation>(
        "SELECT id, title, created_at FROM presentations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(presentation)
}

/// All presentations, newest first.
pub async fn find_all(pool: &PgPool) -> Result<Vec<Presentation>, AppError> {
    let presentations = sqlx::query_as::<_, Presentation>(
        "SELECT id, title, created_at FROM presentations ORDER BY created_at DESC, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(presentations)
}
