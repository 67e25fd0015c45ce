pub mod consumer;

use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppError;
use crate::models::outline::{Language, Outline};
pub use self::consumer::{GenerationState, Navigation, StreamConsumer};

#[derive(Debug, Deserialize)]
struct OutlineResponse {
    outline: Outline,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct GenerationClient {
    http: Client,
    base_url: String,
}

impl GenerationClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        GenerationClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Turn a non-success response into an error carrying the server's message.
    async fn rejection(response: reqwest::Response) -> AppError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        if status.is_client_error() {
            AppError::Validation(message)
        } else {
            AppError::Upstream(format!("{status}: {message}"))
        }
    }

    pub async fn generate_outline(&self, prompt: &str, slide_count: usize, language: Language) -> Result<Outline, AppError> {
        let response = self
            .http
            .post(format!("{}/api/generate-outline", self.base_url))
            .json(&json!({ "prompt": prompt, "slideCount": slide_count, "language": language }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let body: OutlineResponse = response.json().await?;
        Ok(body.outline)
    }

    /// Run slide generation, calling `on_update` after every chunk that was
    /// read. Resolves to the navigation target of the finished presentation.
    pub async fn generate_slides<F>(&self, outline: &Outline, language: Language, mut on_update: F) -> Result<Navigation, AppError>
    where
        F: FnMut(&GenerationState),
    {
        let response = self
            .http
            .post(format!("{}/api/generate-slides", self.base_url))
            .header("accept", "text/event-stream")
            .json(&json!({ "outline": outline, "language": language }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let mut consumer = StreamConsumer::new(outline.len());
        let mut body = Box::pin(response.bytes_stream());
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let finished = consumer.feed(&chunk)?.is_some();
            on_update(consumer.state());
            if finished {
                break;
            }
        }
        consumer.finish()
    }
}
