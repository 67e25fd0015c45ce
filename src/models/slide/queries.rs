use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::errors::AppError;
use super::types::*;

const SLIDE_COLUMNS: &str = "id, presentation_id, position, title, content, background_image, \
                             background_type, style, bullet_style, grid_layout, gradient, created_at";

#[derive(sqlx::FromRow)]
struct SlideRow {
    id: Uuid,
    presentation_id: Uuid,
    position: i32,
    title: String,
    content: String,
    background_image: Option<String>,
    background_type: String,
    style: Json<SlideStyle>,
    bullet_style: Option<String>,
    grid_layout: Option<String>,
    gradient: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SlideRow> for Slide {
    type Error = AppError;

    fn try_from(row: SlideRow) -> Result<Self, Self::Error> {
        Ok(Slide {
            id: row.id,
            presentation_id: row.presentation_id,
            position: row.position,
            title: row.title,
            content: row.content,
            background_image: row.background_image,
            background_type: BackgroundType::from_db(&row.background_type)?,
            style: row.style.0,
            bullet_style: row.bullet_style,
            grid_layout: row.grid_layout,
            gradient: row.gradient,
            created_at: row.created_at,
        })
    }
}

/// Insert a slide. Fails if the position is already taken in the presentation.
pub async fn create(pool: &PgPool, slide: &NewSlide) -> Result<Slide, AppError> {
    let sql = format!(
        "INSERT INTO slides (presentation_id, position, title, content, background_image, \
                             background_type, style, bullet_style, grid_layout, gradient) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {SLIDE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, SlideRow>(&sql)
        .bind(slide.presentation_id)
        .bind(slide.position)
        .bind(&slide.title)
        .bind(&slide.content)
        .bind(&slide.background_image)
        .bind(slide.background_type.as_str())
        .bind(Json(&slide.style))
        .bind(&slide.bullet_style)
        .bind(&slide.grid_layout)
        .bind(&slide.gradient)
        .fetch_one(pool)
        .await?;

    row.try_into()
}

/// Update the given fields of a slide. Returns `None` if no slide has that id.
pub async fn update(pool: &PgPool, id: Uuid, changes: &SlideUpdate) -> Result<Option<Slide>, AppError> {
    let sql = format!(
        "UPDATE slides SET \
             title = COALESCE($2, title), \
             content = COALESCE($3, content), \
             background_image = COALESCE($4, background_image), \
             background_type = COALESCE($5, background_type), \
             style = COALESCE($6, style), \
             bullet_style = COALESCE($7, bullet_style), \
             grid_layout = COALESCE($8, grid_layout), \
             gradient = COALESCE($9, gradient) \
         WHERE id = $1 \
         RETURNING {SLIDE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, SlideRow>(&sql)
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(&changes.background_image)
        .bind(changes.background_type.map(BackgroundType::as_str))
        .bind(changes.style.as_ref().map(Json))
        .bind(&changes.bullet_style)
        .bind(&changes.grid_layout)
        .bind(&changes.gradient)
        .fetch_optional(pool)
        .await?;

    row.map(Slide::try_from).transpose()
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM slides WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// All slides of a presentation, ordered by position.
pub async fn find_for_presentation(pool: &PgPool, presentation_id: Uuid) -> Result<Vec<Slide>, AppError> {
    let sql = format!("SELECT {SLIDE_COLUMNS} FROM slides WHERE presentation_id = $1 ORDER BY position");
    let rows = sqlx::query_as::<_, SlideRow>(&sql)
        .bind(presentation_id)
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(Slide::try_from).collect()
}
