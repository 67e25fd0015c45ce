use serde::Deserialize;

use crate::errors::AppError;
use crate::models::outline::Language;
use crate::models::slide::{DiagramKind, SlideLayout};

pub const MIN_POINTS: usize = 1;
pub const MAX_POINTS: usize = 5;
pub const BULLET: &str = "• ";

pub fn image_prompt(title: &str) -> String {
    format!(
        "Create a modern, minimalist presentation slide background image for topic: {title}. \
         The image should be subtle and not interfere with text overlay."
    )
}

pub fn content_system_prompt(title: &str, language: Language) -> String {
    format!(
        "You are a professional presentation expert. Generate content for slide titled \"{title}\" in {}. \
         Focus on creating clear, concise points.",
        language.display_name()
    )
}

pub fn structured_system_prompt(title: &str, language: Language) -> String {
    format!(
        "{} Answer with a JSON object only: {{\"points\": [1 to {MAX_POINTS} short strings], \
         \"layout\": \"vertical\" | \"horizontal\" | \"grid\", \
         \"diagram\": \"none\" | \"bar\" | \"line\" | \"pie\" | \"flowchart\"}}.",
        content_system_prompt(title, language)
    )
}

pub fn content_user_prompt(title: &str) -> String {
    format!("Generate content for presentation slide: {title}")
}

/// Validated single-shot content for one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideContent {
    points: Vec<String>,
    layout: SlideLayout,
    diagram: DiagramKind,
}

#[derive(Deserialize)]
struct RawSlideContent {
    points: Vec<String>,
    #[serde(default)]
    layout: Option<SlideLayout>,
    #[serde(default)]
    diagram: Option<DiagramKind>,
}

impl SlideContent {
    /// Parse and validate a completion body. Point count, the layout enum and
    /// the diagram enum are all checked; anything else is an error.
    pub fn parse(completion: &str) -> Result<Self, AppError> {
        let raw: RawSlideContent = serde_json::from_str(completion.trim())
            .map_err(|e| AppError::InvalidContent(format!("completion is not valid slide JSON: {e}")))?;

        let points: Vec<String> = raw.points.into_iter().map(|p| p.trim().to_string()).collect();
        if points.len() < MIN_POINTS || points.len() > MAX_POINTS {
            return Err(AppError::InvalidContent(format!(
                "expected {MIN_POINTS} to {MAX_POINTS} points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| p.is_empty()) {
            return Err(AppError::InvalidContent("points must not be blank".to_string()));
        }

        Ok(SlideContent {
            points,
            layout: raw.layout.unwrap_or(SlideLayout::Vertical),
            diagram: raw.diagram.unwrap_or(DiagramKind::None),
        })
    }

    pub fn layout(&self) -> SlideLayout {
        self.layout
    }

    pub fn diagram(&self) -> DiagramKind {
        self.diagram
    }

    /// Points as bullet-prefixed lines joined by newlines.
    pub fn to_text(&self) -> String {
        self.points
            .iter()
            .map(|p| format!("{BULLET}{p}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
