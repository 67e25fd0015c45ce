use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::ProgressEvent;
use crate::sse::{self, LineFramer};

/// Progress shown while a run is still going. 100 is reserved for the
/// `complete` event, so the content-driven estimate stops just below it.
pub const PRE_COMPLETE_CEILING: f64 = 99.0;

pub const STEP_PREPARING: &str = "Preparing presentation...";
pub const STEP_FINISHED: &str = "Presentation is ready!";

/// What the user sees while slides are being generated.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationState {
    pub slide_content: Vec<String>,
    pub step: String,
    pub progress: f64,
    completed: usize,
}

/// Where a finished run sends the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub presentation_id: Uuid,
}

impl Navigation {
    pub fn path(&self) -> String {
        format!("/editor/{}", self.presentation_id)
    }
}

impl GenerationState {
    pub fn new(slide_count: usize) -> Self {
        GenerationState {
            slide_content: vec![String::new(); slide_count],
            step: STEP_PREPARING.to_string(),
            progress: 0.0,
            completed: 0,
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slide_content.len()
    }

    fn percent_of(&self, slides: usize) -> f64 {
        if self.slide_count() == 0 {
            return 0.0;
        }
        (slides as f64 / self.slide_count() as f64 * 100.0).min(100.0)
    }

    /// Raise progress towards `target`, never lowering it and never reaching
    /// 100 before completion.
    fn advance(&mut self, target: f64) {
        self.progress = self.progress.max(target.min(PRE_COMPLETE_CEILING));
    }

    fn check_index(&self, slide: usize) -> Result<(), AppError> {
        if slide >= self.slide_count() {
            return Err(AppError::Protocol(format!(
                "event for slide {slide} but the outline has {} slides",
                self.slide_count()
            )));
        }
        Ok(())
    }

    /// Apply one event. Returns the navigation target on `complete`, and an
    /// error carrying the run's message on `error`.
    pub fn apply(&mut self, event: ProgressEvent) -> Result<Option<Navigation>, AppError> {
        match event {
            ProgressEvent::Content { slide, content } => {
                self.check_index(slide)?;
                self.slide_content[slide].push_str(&content);
                // runs ahead of true completion while slide `slide` is still streaming
                let estimate = self.percent_of(slide + 1);
                self.advance(estimate);
                Ok(None)
            }
            ProgressEvent::SlideComplete { slide } => {
                self.check_index(slide)?;
                self.completed = self.completed.max(slide + 1);
                self.step = format!("slide {}/{} done", slide + 1, self.slide_count());
                let estimate = self.percent_of(self.completed);
                self.advance(estimate);
                Ok(None)
            }
            ProgressEvent::Complete { presentation_id } => {
                self.progress = 100.0;
                self.step = STEP_FINISHED.to_string();
                Ok(Some(Navigation { presentation_id }))
            }
            ProgressEvent::Error { message } => Err(AppError::RunFailed(message)),
        }
    }
}

/// Feeds raw response chunks through a line framer and into a
/// [`GenerationState`].
#[derive(Debug)]
pub struct StreamConsumer {
    framer: LineFramer,
    state: GenerationState,
    navigation: Option<Navigation>,
}

impl StreamConsumer {
    pub fn new(slide_count: usize) -> Self {
        StreamConsumer {
            framer: LineFramer::new(),
            state: GenerationState::new(slide_count),
            navigation: None,
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn navigation(&self) -> Option<&Navigation> {
        self.navigation.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.navigation.is_some()
    }

    /// Process one chunk. Lines after the terminal event are ignored.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<&Navigation>, AppError> {
        for line in self.framer.feed(chunk) {
            self.handle_line(&line)?;
        }
        Ok(self.navigation.as_ref())
    }

    /// Call once the transport has closed.
    pub fn finish(&mut self) -> Result<Navigation, AppError> {
        if let Some(line) = self.framer.finish() {
            self.handle_line(&line)?;
        }
        self.navigation
            .clone()
            .ok_or_else(|| AppError::Protocol("stream ended before the run completed".to_string()))
    }

    fn handle_line(&mut self, line: &str) -> Result<(), AppError> {
        if self.is_finished() {
            return Ok(());
        }
        let Some(payload) = sse::data_payload(line) else {
            return Ok(());
        };
        let event: ProgressEvent = serde_json::from_str(payload)
            .map_err(|e| AppError::Protocol(format!("undecodable event '{payload}': {e}")))?;
        if let Some(navigation) = self.state.apply(event)? {
            self.navigation = Some(navigation);
        }
        Ok(())
    }
}
