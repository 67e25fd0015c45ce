use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::presentation::PresentationDetail;
use crate::models::slide::SlideUpdate;
use super::AppState;

/// GET /api/presentations - newest first
pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let presentations = state.store.list_presentations().await?;
    Ok(HttpResponse::Ok().json(presentations))
}

/// GET /api/presentations/{id} - presentation with its slides in order
pub async fn read(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let presentation = state.store.find_presentation(id).await?.ok_or(AppError::NotFound)?;
    let slides = state.store.slides_for(id).await?;

    Ok(HttpResponse::Ok().json(PresentationDetail { presentation, slides }))
}

/// PATCH /api/slides/{id} - partial update from the editor
pub async fn update_slide(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes: SlideUpdate = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid slide update: {e}")))?;
    if changes.is_empty() {
        return Err(AppError::Validation("Slide update contains no fields".to_string()));
    }
    if matches!(&changes.title, Some(title) if title.trim().is_empty()) {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }

    let slide = state.store.update_slide(id, &changes).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(slide))
}
