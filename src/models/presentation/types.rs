use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::slide::Slide;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Presentation {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A presentation together with its slides, ordered by position.
#[derive(Debug, Clone, Serialize)]
pub struct PresentationDetail {
    #[serde(flatten)]
    pub presentation: Presentation,
    pub slides: Vec<Slide>,
}
