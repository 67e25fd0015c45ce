use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::presentation::{self, Presentation};
use crate::models::slide::{self, NewSlide, Slide, SlideUpdate};

/// Persistence seen by the orchestrator and the HTTP handlers.
#[async_trait]
pub trait SlideStore: Send + Sync {
    async fn create_presentation(&self, title: &str) -> Result<Presentation, AppError>;

    async fn find_presentation(&self, id: Uuid) -> Result<Option<Presentation>, AppError>;

    async fn list_presentations(&self) -> Result<Vec<Presentation>, AppError>;

    async fn create_slide(&self, slide: &NewSlide) -> Result<Slide, AppError>;

    async fn update_slide(&self, id: Uuid, changes: &SlideUpdate) -> Result<Option<Slide>, AppError>;

    /// Returns whether a row was removed.
    async fn delete_slide(&self, id: Uuid) -> Result<bool, AppError>;

    /// Slides of one presentation, ordered by position.
    async fn slides_for(&self, presentation_id: Uuid) -> Result<Vec<Slide>, AppError>;
}

#[derive(Clone)]
pub struct PgSlideStore {
    pool: PgPool,
}

impl PgSlideStore {
    pub fn new(pool: PgPool) -> Self {
        PgSlideStore { pool }
    }
}

#[async_trait]
impl SlideStore for PgSlideStore {
    async fn create_presentation(&self, title: &str) -> Result<Presentation, AppError> {
        presentation::create(&self.pool, title).await
    }

    async fn find_presentation(&self, id: Uuid) -> Result<Option<Presentation>, AppError> {
        presentation::find_by_id(&self.pool, id).await
    }

    async fn list_presentations(&self) -> Result<Vec<Presentation>, AppError> {
        presentation::find_all(&self.pool).await
    }

    async fn create_slide(&self, new_slide: &NewSlide) -> Result<Slide, AppError> {
        slide::create(&self.pool, new_slide).await
    }

    async fn update_slide(&self, id: Uuid, changes: &SlideUpdate) -> Result<Option<Slide>, AppError> {
        slide::update(&self.pool, id, changes).await
    }

    async fn delete_slide(&self, id: Uuid) -> Result<bool, AppError> {
        slide::delete(&self.pool, id).await
    }

    async fn slides_for(&self, presentation_id: Uuid) -> Result<Vec<Slide>, AppError> {
        slide::find_for_presentation(&self.pool, presentation_id).await
    }
}
