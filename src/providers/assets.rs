use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use uuid::Uuid;

use crate::errors::AppError;
use super::{AssetFetcher, BucketCreation, BucketSpec, ObjectStorage};

const IMAGE_CONTENT_TYPE: &str = "image/png";

pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(http: Client) -> Self {
        HttpFetcher { http }
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, AppError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!("image download failed ({status})")));
        }
        Ok(response.bytes().await?)
    }
}

#[derive(Clone)]
pub struct AssetRelocator {
    fetcher: Arc<dyn AssetFetcher>,
    storage: Arc<dyn ObjectStorage>,
    bucket: BucketSpec,
}

impl AssetRelocator {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, storage: Arc<dyn ObjectStorage>, bucket: BucketSpec) -> Self {
        AssetRelocator { fetcher, storage, bucket }
    }

    /// Create the image bucket unless it exists. Losing a creation race to
    /// another run counts as success.
    pub async fn ensure_bucket(&self) -> Result<(), AppError> {
        if self.storage.bucket_exists(&self.bucket.name).await? {
            return Ok(());
        }
        match self.storage.create_bucket(&self.bucket).await? {
            BucketCreation::Created => log::info!("Created storage bucket '{}'", self.bucket.name),
            BucketCreation::AlreadyExists => {
                log::debug!("Storage bucket '{}' was created concurrently", self.bucket.name)
            }
        }
        Ok(())
    }

    /// Download the image at `source_url`, upload it under a fresh name and
    /// return its public URL.
    pub async fn relocate(&self, source_url: &str) -> Result<String, AppError> {
        let data = self.fetcher.fetch(source_url).await?;
        if data.len() as u64 > self.bucket.file_size_limit {
            return Err(AppError::Storage(format!(
                "image is {} bytes, bucket limit is {}",
                data.len(),
                self.bucket.file_size_limit
            )));
        }

        let path = format!("{}.png", Uuid::new_v4());
        self.storage
            .upload(&self.bucket.name, &path, data, IMAGE_CONTENT_TYPE)
            .await?;
        Ok(self.storage.public_url(&self.bucket.name, &path))
    }
}
