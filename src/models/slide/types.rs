use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

pub const DEFAULT_GRADIENT: &str =
    "linear-gradient(90deg, rgba(0,0,0,0.8) 0%, rgba(0,0,0,0.6) 100%)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    Gradient,
    Image,
}

impl BackgroundType {
    pub fn as_str(self) -> &'static str {
        match self {
            BackgroundType::Gradient => "gradient",
            BackgroundType::Image => "image",
        }
    }

    pub fn from_db(value: &str) -> Result<Self, AppError> {
        match value {
            "gradient" => Ok(BackgroundType::Gradient),
            "image" => Ok(BackgroundType::Image),
            other => Err(AppError::Validation(format!("Unknown background type '{other}'"))),
        }
    }
}

/// Arrangement of a slide's text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideLayout {
    Vertical,
    Horizontal,
    Grid,
}

impl SlideLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            SlideLayout::Vertical => "vertical",
            SlideLayout::Horizontal => "horizontal",
            SlideLayout::Grid => "grid",
        }
    }
}

/// Diagram hint attached to a slide by single-shot content generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    None,
    Bar,
    Line,
    Pie,
    Flowchart,
}

/// Style bag stored as JSONB. Unknown keys are refused so the stored shape
/// stays in step with what the editor understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SlideStyle {
    pub title_color: String,
    pub content_color: String,
    pub font_size: String,
    pub layout: SlideLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<DiagramKind>,
}

impl Default for SlideStyle {
    fn default() -> Self {
        SlideStyle {
            title_color: "#ffffff".to_string(),
            content_color: "#ffffff".to_string(),
            font_size: "text-xl".to_string(),
            layout: SlideLayout::Vertical,
            diagram: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub id: Uuid,
    pub presentation_id: Uuid,
    pub position: i32,
    pub title: String,
    pub content: String,
    pub background_image: Option<String>,
    pub background_type: BackgroundType,
    pub style: SlideStyle,
    pub bullet_style: Option<String>,
    pub grid_layout: Option<String>,
    pub gradient: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for one slide.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSlide {
    pub presentation_id: Uuid,
    pub position: i32,
    pub title: String,
    pub content: String,
    pub background_image: Option<String>,
    pub background_type: BackgroundType,
    pub style: SlideStyle,
    pub bullet_style: Option<String>,
    pub grid_layout: Option<String>,
    pub gradient: Option<String>,
}

impl NewSlide {
    /// A generated slide with the default dark overlay and bullet style.
    pub fn generated(
        presentation_id: Uuid,
        position: i32,
        title: &str,
        content: String,
        background_image: Option<String>,
    ) -> Self {
        let background_type = if background_image.is_some() {
            BackgroundType::Image
        } else {
            BackgroundType::Gradient
        };
        NewSlide {
            presentation_id,
            position,
            title: title.to_string(),
            content,
            background_image,
            background_type,
            style: SlideStyle::default(),
            bullet_style: Some("circle".to_string()),
            grid_layout: Some(SlideLayout::Vertical.as_str().to_string()),
            gradient: Some(DEFAULT_GRADIENT.to_string()),
        }
    }
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlideUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub background_image: Option<String>,
    pub background_type: Option<BackgroundType>,
    pub style: Option<SlideStyle>,
    pub bullet_style: Option<String>,
    pub grid_layout: Option<String>,
    pub gradient: Option<String>,
}

impl SlideUpdate {
    pub fn is_empty(&self) -> bool {
        *self == SlideUpdate::default()
    }

    /// Apply the update to an in-memory slide.
    pub fn apply_to(&self, slide: &mut Slide) {
        if let Some(title) = &self.title {
            slide.title = title.clone();
        }
        if let Some(content) = &self.content {
            slide.content = content.clone();
        }
        if let Some(image) = &self.background_image {
            slide.background_image = Some(image.clone());
        }
        if let Some(background_type) = self.background_type {
            slide.background_type = background_type;
        }
        if let Some(style) = &self.style {
            slide.style = style.clone();
        }
        if let Some(bullet_style) = &self.bullet_style {
            slide.bullet_style = Some(bullet_style.clone());
        }
        if let Some(grid_layout) = &self.grid_layout {
            slide.grid_layout = Some(grid_layout.clone());
        }
        if let Some(gradient) = &self.gradient {
            slide.gradient = Some(gradient.clone());
        }
    }
}
