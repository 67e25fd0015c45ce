use serde_json::Value;

use crate::errors::AppError;
use crate::models::outline::{Language, OutlineItem, Outline};

pub fn outline_system_prompt(slide_count: usize, language: Language) -> String {
    format!(
        "You are a professional presentation expert. \
         Generate an outline with {slide_count} points for a presentation in {}. \
         The outline must be well structured and professional. \
         Format every point as a JSON object with an \"id\" and a \"title\". \
         Answer with a JSON array only.",
        language.display_name()
    )
}

/// Extract the outline from a model reply.
///
/// The whole reply is tried first. Models often wrap the array in prose, so
/// failing that, the first well-formed JSON array found in the text is used.
pub fn extract_outline(reply: &str) -> Result<Outline, AppError> {
    let array = match serde_json::from_str::<Value>(reply.trim()) {
        Ok(value @ Value::Array(_)) => value,
        _ => first_json_array(reply)
            .ok_or_else(|| AppError::Upstream("Could not parse outline from model reply".to_string()))?,
    };

    let items: Vec<OutlineItem> = serde_json::from_value(array)
        .map_err(|e| AppError::Upstream(format!("Outline items are malformed: {e}")))?;
    // an unusable reply is the model's fault, not the caller's
    Outline::new(items).map_err(|e| AppError::Upstream(format!("Model returned an unusable outline: {e}")))
}

fn first_json_array(text: &str) -> Option<Value> {
    text.match_indices('[').find_map(|(start, _)| {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(value @ Value::Array(_))) => Some(value),
            _ => None,
        }
    })
}
