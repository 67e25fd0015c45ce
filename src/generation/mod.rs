//! The slide generation pipeline.
//!
//! A run walks the outline strictly in order. For each item it generates a
//! background image, re-hosts it, generates the slide text, persists the
//! slide and only then reports the slide as complete. Every state change is
//! pushed into a bounded channel that the HTTP response drains; when the
//! client goes away the next send fails and the run stops.

pub mod content;
pub mod events;
pub mod outline;

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::config::PersistStrategy;
use crate::errors::AppError;
use crate::models::outline::{Language, Outline};
use crate::models::slide::{NewSlide, SlideUpdate};
use crate::providers::assets::AssetRelocator;
use crate::providers::{ContentGenerator, GeneratedContent, ImageGenerator};
use crate::store::SlideStore;
use self::content::{SlideContent, image_prompt};
pub use self::events::ProgressEvent;

/// Events buffered between the run and the response body. Kept at one so
/// a slow reader holds the run back.
pub const EVENT_CHANNEL_CAPACITY: usize = 1;

/// Sending half of a run's event stream.
pub struct EventSink {
    tx: mpsc::Sender<ProgressEvent>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        EventSink { tx }
    }

    /// Waits for room in the channel; fails once the receiver is gone.
    pub async fn send(&self, event: ProgressEvent) -> Result<(), AppError> {
        self.tx.send(event).await.map_err(|_| AppError::Disconnected)
    }
}

pub struct Orchestrator {
    store: Arc<dyn SlideStore>,
    images: Arc<dyn ImageGenerator>,
    content: Arc<dyn ContentGenerator>,
    assets: AssetRelocator,
    persist: PersistStrategy,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn SlideStore>,
        images: Arc<dyn ImageGenerator>,
        content: Arc<dyn ContentGenerator>,
        assets: AssetRelocator,
        persist: PersistStrategy,
    ) -> Self {
        Orchestrator { store, images, content, assets, persist }
    }

    /// Start a run in the background and return its event stream.
    pub fn generate(self: &Arc<Self>, outline: Outline, language: Language) -> ReceiverStream<ProgressEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            orchestrator.run(&outline, language, &EventSink::new(tx)).await;
        });
        ReceiverStream::new(rx)
    }

    /// Execute one run to its terminal event.
    pub async fn run(&self, outline: &Outline, language: Language, sink: &EventSink) {
        log::info!("Generation run started: {} slides, language {}", outline.len(), language.code());

        let terminal = match self.execute(outline, language, sink).await {
            Ok(presentation_id) => {
                log::info!("Generation run complete: presentation {presentation_id}");
                ProgressEvent::Complete { presentation_id }
            }
            Err(AppError::Disconnected) => {
                log::warn!("Client disconnected, generation run aborted");
                return;
            }
            Err(e) => {
                log::error!("Generation run failed: {e}");
                ProgressEvent::Error { message: e.to_string() }
            }
        };

        if sink.send(terminal).await.is_err() {
            log::warn!("Client disconnected before the terminal event");
        }
    }

    async fn execute(&self, outline: &Outline, language: Language, sink: &EventSink) -> Result<Uuid, AppError> {
        self.assets.ensure_bucket().await?;

        let presentation = self.store.create_presentation(outline.first_title()).await?;
        log::info!("Created presentation {} '{}'", presentation.id, presentation.title);

        for (index, item) in outline.items().iter().enumerate() {
            self.generate_slide(presentation.id, index, &item.title, language, sink).await?;
            sink.send(ProgressEvent::SlideComplete { slide: index }).await?;
        }

        Ok(presentation.id)
    }

    async fn generate_slide(
        &self,
        presentation_id: Uuid,
        index: usize,
        title: &str,
        language: Language,
        sink: &EventSink,
    ) -> Result<(), AppError> {
        let position = i32::try_from(index)
            .map_err(|_| AppError::Validation(format!("slide index {index} out of range")))?;

        let generated_url = self.images.generate_image(&image_prompt(title)).await?;
        let image_url = self.assets.relocate(&generated_url).await?;
        log::debug!("Slide {index}: background stored at {image_url}");

        let mut new_slide = NewSlide::generated(presentation_id, position, title, String::new(), Some(image_url));
        match self.persist {
            PersistStrategy::InsertWhenReady => {
                self.fill_content(&mut new_slide, index, title, language, sink).await?;
                self.store.create_slide(&new_slide).await?;
            }
            PersistStrategy::PlaceholderThenUpdate => {
                let placeholder = NewSlide {
                    content: language.placeholder_content().to_string(),
                    ..new_slide.clone()
                };
                let existing = self.store.create_slide(&placeholder).await?;
                if let Err(e) = self.fill_placeholder(existing.id, new_slide, index, title, language, sink).await {
                    self.discard_placeholder(existing.id).await;
                    return Err(e);
                }
            }
        }
        log::info!("Slide {index} of presentation {presentation_id} persisted");
        Ok(())
    }

    /// Generate the slide text into `slide`, forwarding streamed fragments.
    async fn fill_content(
        &self,
        slide: &mut NewSlide,
        index: usize,
        title: &str,
        language: Language,
        sink: &EventSink,
    ) -> Result<(), AppError> {
        match self.content.generate_content(title, language).await? {
            GeneratedContent::Stream(mut fragments) => {
                while let Some(fragment) = fragments.next().await {
                    let fragment = fragment?;
                    if fragment.is_empty() {
                        continue;
                    }
                    slide.content.push_str(&fragment);
                    sink.send(ProgressEvent::Content { slide: index, content: fragment }).await?;
                }
            }
            GeneratedContent::Structured(structured) => apply_structured(slide, &structured),
        }
        Ok(())
    }

    async fn fill_placeholder(
        &self,
        placeholder_id: Uuid,
        mut slide: NewSlide,
        index: usize,
        title: &str,
        language: Language,
        sink: &EventSink,
    ) -> Result<(), AppError> {
        self.fill_content(&mut slide, index, title, language, sink).await?;
        let changes = SlideUpdate {
            content: Some(slide.content),
            style: Some(slide.style),
            grid_layout: slide.grid_layout,
            ..SlideUpdate::default()
        };
        self.store
            .update_slide(placeholder_id, &changes)
            .await?
            .ok_or_else(|| AppError::Storage(format!("placeholder slide {placeholder_id} vanished")))?;
        Ok(())
    }

    /// A failed slide leaves no row behind, placeholder included.
    async fn discard_placeholder(&self, id: Uuid) {
        match self.store.delete_slide(id).await {
            Ok(_) => log::debug!("Discarded placeholder slide {id}"),
            Err(e) => log::error!("Could not discard placeholder slide {id}: {e}"),
        }
    }
}

fn apply_structured(slide: &mut NewSlide, structured: &SlideContent) {
    slide.content = structured.to_text();
    slide.style.layout = structured.layout();
    slide.style.diagram = Some(structured.diagram());
    slide.grid_layout = Some(structured.layout().as_str().to_string());
}
