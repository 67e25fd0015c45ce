//! Shared test infrastructure: in-memory stand-ins for every collaborator of
//! a generation run.
//!
//! # Building an orchestrator
//! - `Harness::new()` - everything succeeds, streaming content
//! - tweak the public fields (`images.fail_at`, `content.fail_at`, ...) before
//!   calling `harness.orchestrator()`

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures_util::{StreamExt, stream};
use uuid::Uuid;

use slidegen::config::PersistStrategy;
use slidegen::errors::AppError;
use slidegen::generation::content::SlideContent;
use slidegen::generation::{Orchestrator, ProgressEvent};
use slidegen::models::outline::{Language, Outline, OutlineItem};
use slidegen::models::presentation::Presentation;
use slidegen::models::slide::{NewSlide, Slide, SlideUpdate};
use slidegen::providers::assets::AssetRelocator;
use slidegen::providers::{
    AssetFetcher, BucketCreation, BucketSpec, ContentGenerator, GeneratedContent, ImageGenerator,
    ObjectStorage, OutlineGenerator,
};
use slidegen::store::SlideStore;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const BUCKET: &str = "presentation_images";
pub const STORAGE_BASE: &str = "https://storage.test";

pub fn outline(titles: &[&str]) -> Outline {
    let items = titles
        .iter()
        .enumerate()
        .map(|(i, title)| OutlineItem { id: i as i64 + 1, title: title.to_string() })
        .collect();
    Outline::new(items).expect("valid outline")
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    pub presentations: Mutex<Vec<Presentation>>,
    pub slides: Mutex<Vec<Slide>>,
    pub fail_presentation: bool,
    /// Reject the insert of the slide at this position.
    pub fail_slide_at: Option<i32>,
}

impl MemoryStore {
    pub fn slides_of(&self, presentation_id: Uuid) -> Vec<Slide> {
        let mut slides: Vec<Slide> = self
            .slides
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.presentation_id == presentation_id)
            .cloned()
            .collect();
        slides.sort_by_key(|s| s.position);
        slides
    }

    pub fn presentation_count(&self) -> usize {
        self.presentations.lock().unwrap().len()
    }
}

#[async_trait]
impl SlideStore for MemoryStore {
    async fn create_presentation(&self, title: &str) -> Result<Presentation, AppError> {
        if self.fail_presentation {
            return Err(AppError::Storage("presentations table unavailable".to_string()));
        }
        let presentation = Presentation { id: Uuid::new_v4(), title: title.to_string(), created_at: Utc::now() };
        self.presentations.lock().unwrap().push(presentation.clone());
        Ok(presentation)
    }

    async fn find_presentation(&self, id: Uuid) -> Result<Option<Presentation>, AppError> {
        Ok(self.presentations.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list_presentations(&self) -> Result<Vec<Presentation>, AppError> {
        let mut all = self.presentations.lock().unwrap().clone();
        all.reverse();
        Ok(all)
    }

    async fn create_slide(&self, new_slide: &NewSlide) -> Result<Slide, AppError> {
        if self.fail_slide_at == Some(new_slide.position) {
            return Err(AppError::Storage(format!("insert of slide {} rejected", new_slide.position)));
        }
        let known = self
            .presentations
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.id == new_slide.presentation_id);
        if !known {
            return Err(AppError::Storage("slide references unknown presentation".to_string()));
        }
        let mut slides = self.slides.lock().unwrap();
        if slides
            .iter()
            .any(|s| s.presentation_id == new_slide.presentation_id && s.position == new_slide.position)
        {
            return Err(AppError::Storage(format!("position {} already taken", new_slide.position)));
        }
        let slide = Slide {
            id: Uuid::new_v4(),
            presentation_id: new_slide.presentation_id,
            position: new_slide.position,
            title: new_slide.title.clone(),
            content: new_slide.content.clone(),
            background_image: new_slide.background_image.clone(),
            background_type: new_slide.background_type,
            style: new_slide.style.clone(),
            bullet_style: new_slide.bullet_style.clone(),
            grid_layout: new_slide.grid_layout.clone(),
            gradient: new_slide.gradient.clone(),
            created_at: Utc::now(),
        };
        slides.push(slide.clone());
        Ok(slide)
    }

    async fn update_slide(&self, id: Uuid, changes: &SlideUpdate) -> Result<Option<Slide>, AppError> {
        let mut slides = self.slides.lock().unwrap();
        Ok(slides.iter_mut().find(|s| s.id == id).map(|slide| {
            changes.apply_to(slide);
            slide.clone()
        }))
    }

    async fn delete_slide(&self, id: Uuid) -> Result<bool, AppError> {
        let mut slides = self.slides.lock().unwrap();
        let before = slides.len();
        slides.retain(|s| s.id != id);
        Ok(slides.len() < before)
    }

    async fn slides_for(&self, presentation_id: Uuid) -> Result<Vec<Slide>, AppError> {
        Ok(self.slides_of(presentation_id))
    }
}

// ============================================================================
// PROVIDERS
// ============================================================================

#[derive(Default)]
pub struct FakeImages {
    pub calls: AtomicUsize,
    /// Fail the call with this zero-based index.
    pub fail_at: Option<usize>,
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate_image(&self, prompt: &str) -> Result<String, AppError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(n) {
            return Err(AppError::Upstream("image quota exceeded".to_string()));
        }
        assert!(prompt.contains("minimalist"), "unexpected image prompt: {prompt}");
        Ok(format!("https://images.provider.test/{n}.png"))
    }
}

#[derive(Default)]
pub struct FakeFetcher {
    pub fetched: Mutex<Vec<String>>,
}

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, AppError> {
        self.fetched.lock().unwrap().push(url.to_string());
        Ok(Bytes::from_static(b"\x89PNG fake image"))
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    pub buckets: Mutex<HashSet<String>>,
    pub objects: Mutex<HashMap<String, Bytes>>,
    pub create_calls: AtomicUsize,
    /// Report every bucket as missing, so each caller races to create it.
    pub stale_lookup: bool,
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, AppError> {
        if self.stale_lookup {
            return Ok(false);
        }
        Ok(self.buckets.lock().unwrap().contains(bucket))
    }

    async fn create_bucket(&self, spec: &BucketSpec) -> Result<BucketCreation, AppError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.buckets.lock().unwrap().insert(spec.name.clone()) {
            Ok(BucketCreation::Created)
        } else {
            Ok(BucketCreation::AlreadyExists)
        }
    }

    async fn upload(&self, bucket: &str, path: &str, data: Bytes, content_type: &str) -> Result<(), AppError> {
        assert_eq!(content_type, "image/png");
        if !self.buckets.lock().unwrap().contains(bucket) {
            return Err(AppError::Storage(format!("bucket {bucket} does not exist")));
        }
        let key = format!("{bucket}/{path}");
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key) {
            return Err(AppError::Storage(format!("{key} already exists")));
        }
        objects.insert(key, data);
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{STORAGE_BASE}/storage/v1/object/public/{bucket}/{path}")
    }
}

/// Content provider driven by a script: fragments per slide title, or a raw
/// single-shot completion per title.
#[derive(Default)]
pub struct ScriptedContent {
    pub fragments: HashMap<String, Vec<String>>,
    pub completions: HashMap<String, String>,
    pub calls: AtomicUsize,
    /// Fail the call with this zero-based index before any fragment.
    pub fail_at: Option<usize>,
    /// Break the stream of this call after its first fragment.
    pub break_stream_at: Option<usize>,
    pub languages: Mutex<Vec<Language>>,
}

impl ScriptedContent {
    pub fn streaming(script: &[(&str, &[&str])]) -> Self {
        ScriptedContent {
            fragments: script
                .iter()
                .map(|(title, parts)| (title.to_string(), parts.iter().map(|p| p.to_string()).collect()))
                .collect(),
            ..ScriptedContent::default()
        }
    }

    pub fn single_shot(script: &[(&str, &str)]) -> Self {
        ScriptedContent {
            completions: script.iter().map(|(t, c)| (t.to_string(), c.to_string())).collect(),
            ..ScriptedContent::default()
        }
    }
}

#[async_trait]
impl ContentGenerator for ScriptedContent {
    async fn generate_content(&self, title: &str, language: Language) -> Result<GeneratedContent, AppError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.languages.lock().unwrap().push(language);
        if self.fail_at == Some(n) {
            return Err(AppError::Upstream("OpenAI API error (429): rate limited".to_string()));
        }
        if let Some(completion) = self.completions.get(title) {
            return Ok(GeneratedContent::Structured(SlideContent::parse(completion)?));
        }
        let parts = self
            .fragments
            .get(title)
            .cloned()
            .unwrap_or_else(|| vec![format!("Content for {title}")]);
        let mut items: Vec<Result<String, AppError>> = parts.into_iter().map(Ok).collect();
        if self.break_stream_at == Some(n) {
            items.truncate(1);
            items.push(Err(AppError::Upstream("stream reset".to_string())));
        }
        Ok(GeneratedContent::Stream(stream::iter(items).boxed()))
    }
}

pub struct FixedOutlines {
    pub reply: Outline,
}

#[async_trait]
impl OutlineGenerator for FixedOutlines {
    async fn generate_outline(&self, _prompt: &str, slide_count: usize, _language: Language) -> Result<Outline, AppError> {
        let items = self.reply.items().iter().take(slide_count).cloned().collect();
        Outline::new(items)
    }
}

// ============================================================================
// HARNESS
// ============================================================================

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub images: Arc<FakeImages>,
    pub fetcher: Arc<FakeFetcher>,
    pub storage: Arc<MemoryStorage>,
    pub content: Arc<ScriptedContent>,
    pub persist: PersistStrategy,
}

impl Harness {
    pub fn new() -> Self {
        Harness {
            store: Arc::new(MemoryStore::default()),
            images: Arc::new(FakeImages::default()),
            fetcher: Arc::new(FakeFetcher::default()),
            storage: Arc::new(MemoryStorage::default()),
            content: Arc::new(ScriptedContent::default()),
            persist: PersistStrategy::InsertWhenReady,
        }
    }

    pub fn relocator(&self) -> AssetRelocator {
        AssetRelocator::new(self.fetcher.clone(), self.storage.clone(), BucketSpec::images(BUCKET))
    }

    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        Arc::new(Orchestrator::new(
            self.store.clone(),
            self.images.clone(),
            self.content.clone(),
            self.relocator(),
            self.persist,
        ))
    }

    /// Run to completion and collect every emitted event.
    pub async fn run(&self, outline: Outline, language: Language) -> Vec<ProgressEvent> {
        self.orchestrator().generate(outline, language).collect().await
    }
}

/// The slide indexes of `slide-complete` events, in emission order.
pub fn completed_slides(events: &[ProgressEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::SlideComplete { slide } => Some(*slide),
            _ => None,
        })
        .collect()
}

/// Concatenated `content` fragments of one slide, in emission order.
pub fn streamed_text(events: &[ProgressEvent], index: usize) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Content { slide, content } if *slide == index => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// DATABASE
// ============================================================================

/// Pool against `TEST_DATABASE_URL` with the schema applied, or `None` when
/// the variable is unset so database tests can skip.
pub async fn test_pool() -> Option<sqlx::PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = slidegen::db::init_pool(&url, 2).await.expect("connect to TEST_DATABASE_URL");
    slidegen::db::run_migrations(&pool).await.expect("apply schema");
    Some(pool)
}
