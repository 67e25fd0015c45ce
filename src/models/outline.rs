use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Upper bound on slides requested from the outline generator.
pub const MAX_SLIDES: usize = 20;

/// Language the generated slide text is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Da,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Da => "da",
            Language::En => "en",
        }
    }

    /// English name of the language, used when prompting providers.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Da => "Danish",
            Language::En => "English",
        }
    }

    pub fn placeholder_content(self) -> &'static str {
        match self {
            Language::Da => "Genererer indhold...",
            Language::En => "Generating content...",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "da" => Ok(Language::Da),
            "en" => Ok(Language::En),
            other => Err(AppError::Validation(format!(
                "Unsupported language '{other}', expected 'da' or 'en'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineItem {
    pub id: i64,
    pub title: String,
}

/// Ordered, non-empty list of slide titles. Order fixes both the generation
/// sequence and each slide's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Outline(Vec<OutlineItem>);

impl Outline {
    pub fn new(items: Vec<OutlineItem>) -> Result<Self, AppError> {
        if items.is_empty() {
            return Err(AppError::Validation("Outline must contain at least one slide".to_string()));
        }
        if let Some(pos) = items.iter().position(|item| item.title.trim().is_empty()) {
            return Err(AppError::Validation(format!("Outline item {pos} has an empty title")));
        }
        Ok(Outline(items))
    }

    pub fn items(&self) -> &[OutlineItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Title the presentation is created with.
    pub fn first_title(&self) -> &str {
        &self.0[0].title
    }
}

impl<'de> Deserialize<'de> for Outline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items = Vec::<OutlineItem>::deserialize(deserializer)?;
        Outline::new(items).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, title: &str) -> OutlineItem {
        OutlineItem { id, title: title.to_string() }
    }

    #[test]
    fn empty_outline_is_rejected() {
        assert!(matches!(Outline::new(vec![]), Err(AppError::Validation(_))));
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = Outline::new(vec![item(1, "Intro"), item(2, "  ")]).unwrap_err();
        assert!(err.to_string().contains("item 1"));
    }

    #[test]
    fn deserialize_validates() {
        let ok: Outline = serde_json::from_str(r#"[{"id":1,"title":"A"},{"id":2,"title":"B"}]"#).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.first_title(), "A");
        assert!(serde_json::from_str::<Outline>("[]").is_err());
        assert!(serde_json::from_str::<Outline>(r#"[{"title":"missing id"}]"#).is_err());
    }

    #[test]
    fn language_tags() {
        assert_eq!("da".parse::<Language>().unwrap(), Language::Da);
        assert!("de".parse::<Language>().is_err());
        assert_eq!(serde_json::to_string(&Language::En).unwrap(), "\"en\"");
    }
}
