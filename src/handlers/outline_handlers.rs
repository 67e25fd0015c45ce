use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::outline::{Language, MAX_SLIDES};
use super::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineRequest {
    pub prompt: String,
    pub slide_count: usize,
    pub language: Language,
}

impl OutlineRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.prompt.trim().is_empty() {
            return Err(AppError::Validation("Prompt is required".to_string()));
        }
        if self.slide_count == 0 || self.slide_count > MAX_SLIDES {
            return Err(AppError::Validation(format!(
                "slideCount must be between 1 and {MAX_SLIDES}"
            )));
        }
        Ok(())
    }
}

/// POST /api/generate-outline
pub async fn generate(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, AppError> {
    let request: OutlineRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Missing required parameters: {e}")))?;
    request.validate()?;

    log::info!(
        "Generating outline: {} slides, language {}",
        request.slide_count,
        request.language.code()
    );
    let outline = state
        .outlines
        .generate_outline(request.prompt.trim(), request.slide_count, request.language)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "outline": outline })))
}
