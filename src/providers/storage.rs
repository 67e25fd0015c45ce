use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode};

use crate::config::StorageConfig;
use crate::errors::AppError;
use super::{BucketCreation, BucketSpec, ObjectStorage};

pub struct StorageClient {
    http: Client,
    base_url: String,
    service_key: String,
}

impl StorageClient {
    pub fn new(http: Client, config: &StorageConfig) -> Self {
        StorageClient {
            http,
            base_url: config.url.clone(),
            service_key: config.service_key.clone(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }
}

/// Whether a failed create-bucket response means the bucket is already there.
/// The store answers 409, or 400 with an "already exists" message, depending
/// on version.
pub fn is_already_exists(status: StatusCode, body: &str) -> bool {
    status == StatusCode::CONFLICT || body.to_ascii_lowercase().contains("already exists")
}

#[async_trait]
impl ObjectStorage for StorageClient {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, AppError> {
        let url = format!("{}/storage/v1/bucket/{bucket}", self.base_url);
        let response = self.authorized(self.http.get(url)).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        let body = response.text().await.unwrap_or_default();
        // a missing bucket is reported as 404, or 400 "Bucket not found"
        if status == StatusCode::NOT_FOUND || body.to_ascii_lowercase().contains("not found") {
            return Ok(false);
        }
        Err(AppError::Storage(format!("bucket lookup failed ({status}): {body}")))
    }

    async fn create_bucket(&self, spec: &BucketSpec) -> Result<BucketCreation, AppError> {
        let url = format!("{}/storage/v1/bucket", self.base_url);
        let body = serde_json::json!({
            "id": spec.name,
            "name": spec.name,
            "public": spec.public,
            "allowed_mime_types": spec.allowed_mime_types,
            "file_size_limit": spec.file_size_limit,
        });
        let response = self.authorized(self.http.post(url)).json(&body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(BucketCreation::Created);
        }
        let text = response.text().await.unwrap_or_default();
        if is_already_exists(status, &text) {
            return Ok(BucketCreation::AlreadyExists);
        }
        Err(AppError::Storage(format!("bucket creation failed ({status}): {text}")))
    }

    async fn upload(&self, bucket: &str, path: &str, data: Bytes, content_type: &str) -> Result<(), AppError> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.base_url);
        let response = self
            .authorized(self.http.post(url))
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!("upload of '{path}' failed ({status}): {text}")));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base_url)
    }
}
