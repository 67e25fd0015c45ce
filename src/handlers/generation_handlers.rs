use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::outline::{Language, Outline};
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateSlidesRequest {
    pub outline: Outline,
    pub language: Language,
}

impl GenerateSlidesRequest {
    /// Parse a request body. Any problem is a validation error so the caller
    /// gets a JSON 400 before the stream starts.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid outline format: {e}")))
    }
}

/// POST /api/generate-slides
/// Streams the run's progress events as `text/event-stream`. Failures during
/// the run arrive as an `error` event with status 200.
pub async fn generate_slides(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, AppError> {
    let request = GenerateSlidesRequest::from_body(&body)?;
    log::info!(
        "Slide generation requested for '{}' ({} slides)",
        request.outline.first_title(),
        request.outline.len()
    );

    let events = state
        .orchestrator
        .generate(request.outline, request.language)
        .map(|event| event.to_frame());

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(events))
}
