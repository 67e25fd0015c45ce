use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, stream};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::{ContentMode, OpenAiConfig};
use crate::errors::AppError;
use crate::generation::content::{self, SlideContent};
use crate::generation::outline::{extract_outline, outline_system_prompt};
use crate::models::outline::{Language, Outline};
use crate::sse::{self, LineFramer};
use super::{ContentGenerator, FragmentStream, GeneratedContent, ImageGenerator, OutlineGenerator};

const IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
    mode: ContentMode,
}

impl OpenAiClient {
    pub fn new(http: Client, config: OpenAiConfig, mode: ContentMode) -> Self {
        OpenAiClient { http, config, mode }
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response, AppError> {
        let response = self
            .http
            .post(format!("{}{path}", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::error!("OpenAI {path} returned {status}: {text}");
            return Err(AppError::Upstream(format!("OpenAI API error ({status}): {text}")));
        }
        Ok(response)
    }

    /// One non-streaming chat completion; returns the message text.
    async fn complete(&self, body: &serde_json::Value) -> Result<String, AppError> {
        let response: ChatResponse = self.post("/chat/completions", body).await?.json().await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::Upstream("completion contained no message".to_string()))
    }
}

#[async_trait]
impl ImageGenerator for OpenAiClient {
    async fn generate_image(&self, prompt: &str) -> Result<String, AppError> {
        let body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "n": 1,
            "size": IMAGE_SIZE,
        });
        let response: ImageResponse = self.post("/images/generations", &body).await?.json().await?;
        response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or_else(|| AppError::Upstream("image response contained no URL".to_string()))
    }
}

#[async_trait]
impl ContentGenerator for OpenAiClient {
    async fn generate_content(&self, title: &str, language: Language) -> Result<GeneratedContent, AppError> {
        match self.mode {
            ContentMode::Stream => {
                let body = streaming_content_body(&self.config.content_model, title, language);
                let response = self.post("/chat/completions", &body).await?;
                Ok(GeneratedContent::Stream(fragment_stream(response.bytes_stream())))
            }
            ContentMode::SingleShot => {
                let body = structured_content_body(&self.config.content_model, title, language);
                let completion = self.complete(&body).await?;
                Ok(GeneratedContent::Structured(SlideContent::parse(&completion)?))
            }
        }
    }
}

#[async_trait]
impl OutlineGenerator for OpenAiClient {
    async fn generate_outline(&self, prompt: &str, slide_count: usize, language: Language) -> Result<Outline, AppError> {
        let body = json!({
            "model": self.config.outline_model,
            "messages": [
                { "role": "system", "content": outline_system_prompt(slide_count, language) },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.7,
        });
        let reply = self.complete(&body).await?;
        log::debug!("Outline reply: {reply}");
        extract_outline(&reply)
    }
}

fn streaming_content_body(model: &str, title: &str, language: Language) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": content::content_system_prompt(title, language) },
            { "role": "user", "content": content::content_user_prompt(title) },
        ],
        "stream": true,
    })
}

/// Single-shot request. JSON mode needs a model that supports
/// `response_format`, which the default content model does.
fn structured_content_body(model: &str, title: &str, language: Language) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": content::structured_system_prompt(title, language) },
            { "role": "user", "content": content::content_user_prompt(title) },
        ],
        "temperature": 0.7,
        "response_format": { "type": "json_object" },
    })
}

/// Decode one line of a chat-completion event stream.
enum UpstreamLine {
    Delta(String),
    Done,
    Skip,
}

fn parse_upstream_line(line: &str) -> Result<UpstreamLine, AppError> {
    let Some(payload) = sse::data_payload(line.trim_start()) else {
        return Ok(UpstreamLine::Skip);
    };
    let payload = payload.trim();
    if payload == sse::DONE_MARKER {
        return Ok(UpstreamLine::Done);
    }
    let chunk: StreamChunk = serde_json::from_str(payload)
        .map_err(|e| AppError::Upstream(format!("malformed stream chunk: {e}")))?;
    let delta = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .unwrap_or_default();
    Ok(UpstreamLine::Delta(delta))
}

struct FragmentState<S> {
    bytes: S,
    framer: LineFramer,
    ready: VecDeque<Result<String, AppError>>,
    finished: bool,
}

impl<S> FragmentState<S> {
    /// Queue the fragments carried by `lines`; stops at `[DONE]` or the first
    /// malformed line.
    fn absorb(&mut self, lines: Vec<String>) {
        for line in lines {
            match parse_upstream_line(&line) {
                Ok(UpstreamLine::Delta(text)) if !text.is_empty() => self.ready.push_back(Ok(text)),
                Ok(UpstreamLine::Delta(_)) | Ok(UpstreamLine::Skip) => {}
                Ok(UpstreamLine::Done) => {
                    self.finished = true;
                    return;
                }
                Err(e) => {
                    self.ready.push_back(Err(e));
                    self.finished = true;
                    return;
                }
            }
        }
    }
}

/// Turn a raw chat-completion body into a stream of non-empty text fragments.
/// Each fragment is yielded as soon as its line is complete.
pub fn fragment_stream<S, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    let state = FragmentState {
        bytes: Box::pin(bytes),
        framer: LineFramer::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.ready.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let lines = state.framer.feed(&chunk);
                    state.absorb(lines);
                }
                Some(Err(e)) => {
                    state.ready.push_back(Err(e.into()));
                    state.finished = true;
                }
                None => {
                    // upstream closed without [DONE]; keep what arrived
                    let tail: Vec<String> = state.framer.finish().into_iter().collect();
                    state.absorb(tail);
                    state.finished = true;
                }
            }
        }
    }))
}
