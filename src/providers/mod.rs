pub mod assets;
pub mod openai;
pub mod storage;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use crate::errors::AppError;
use crate::generation::content::SlideContent;
use crate::models::outline::{Language, Outline};

/// Incremental slide text, in arrival order.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, AppError>> + Send>>;

/// What a content provider hands back for one slide.
pub enum GeneratedContent {
    Stream(FragmentStream),
    Structured(SlideContent),
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image and return where the provider hosts it.
    async fn generate_image(&self, prompt: &str) -> Result<String, AppError>;
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_content(&self, title: &str, language: Language) -> Result<GeneratedContent, AppError>;
}

#[async_trait]
pub trait OutlineGenerator: Send + Sync {
    async fn generate_outline(&self, prompt: &str, slide_count: usize, language: Language) -> Result<Outline, AppError>;
}

/// Result of asking storage to create a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCreation {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSpec {
    pub name: String,
    pub public: bool,
    pub allowed_mime_types: Vec<String>,
    pub file_size_limit: u64,
}

impl BucketSpec {
    pub const IMAGE_SIZE_LIMIT: u64 = 5 * 1024 * 1024;

    /// Public bucket for generated slide backgrounds.
    pub fn images(name: &str) -> Self {
        BucketSpec {
            name: name.to_string(),
            public: true,
            allowed_mime_types: vec!["image/png".to_string(), "image/jpeg".to_string()],
            file_size_limit: Self::IMAGE_SIZE_LIMIT,
        }
    }
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, AppError>;

    async fn create_bucket(&self, spec: &BucketSpec) -> Result<BucketCreation, AppError>;

    async fn upload(&self, bucket: &str, path: &str, data: Bytes, content_type: &str) -> Result<(), AppError>;

    /// Stable public reference to an uploaded object.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, AppError>;
}
