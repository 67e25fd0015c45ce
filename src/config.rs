use crate::errors::AppError;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_IMAGE_BUCKET: &str = "presentation_images";
pub const DEFAULT_OUTLINE_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CONTENT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// How slide text is requested from the content provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Incremental token stream, forwarded fragment by fragment.
    Stream,
    /// One JSON completion validated against the slide content schema.
    SingleShot,
}

impl ContentMode {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim() {
            "stream" => Ok(ContentMode::Stream),
            "single_shot" => Ok(ContentMode::SingleShot),
            other => Err(AppError::Config(format!(
                "CONTENT_MODE must be 'stream' or 'single_shot', got '{other}'"
            ))),
        }
    }
}

/// When a slide row is written during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStrategy {
    /// Insert once, after the slide content is complete.
    InsertWhenReady,
    /// Insert a placeholder once the image is ready, then fill in the content.
    PlaceholderThenUpdate,
}

impl PersistStrategy {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim() {
            "ready" => Ok(PersistStrategy::InsertWhenReady),
            "placeholder" => Ok(PersistStrategy::PlaceholderThenUpdate),
            other => Err(AppError::Config(format!(
                "SLIDE_PERSIST must be 'ready' or 'placeholder', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub outline_model: String,
    pub content_model: String,
    pub image_model: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: String,
    pub service_key: String,
    pub bucket: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub openai: OpenAiConfig,
    pub storage: StorageConfig,
    pub content_mode: ContentMode,
    pub persist: PersistStrategy,
}

impl AppConfig {
    /// Missing credentials are an error here, before the server starts.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, AppError> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => Err(AppError::Config(format!("{key} is required"))),
            }
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let db_max_connections = optional("DB_MAX_CONNECTIONS", "8")
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| AppError::Config("DB_MAX_CONNECTIONS must be a positive integer".to_string()))?;

        Ok(AppConfig {
            bind_addr: optional("BIND_ADDR", DEFAULT_BIND_ADDR),
            database_url: required("DATABASE_URL")?,
            db_max_connections,
            openai: OpenAiConfig {
                api_key: required("OPENAI_API_KEY")?,
                base_url: optional("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
                outline_model: optional("OUTLINE_MODEL", DEFAULT_OUTLINE_MODEL),
                content_model: optional("CONTENT_MODEL", DEFAULT_CONTENT_MODEL),
                image_model: optional("IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            },
            storage: StorageConfig {
                url: required("STORAGE_URL")?.trim_end_matches('/').to_string(),
                service_key: required("STORAGE_SERVICE_KEY")?,
                bucket: optional("IMAGE_BUCKET", DEFAULT_IMAGE_BUCKET),
            },
            content_mode: ContentMode::parse(&optional("CONTENT_MODE", "stream"))?,
            persist: PersistStrategy::parse(&optional("SLIDE_PERSIST", "ready"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/slidegen"),
        ("OPENAI_API_KEY", "sk-test"),
        ("STORAGE_URL", "https://storage.example/"),
        ("STORAGE_SERVICE_KEY", "service"),
    ];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = AppConfig::from_lookup(lookup_from(BASE)).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.storage.url, "https://storage.example");
        assert_eq!(config.storage.bucket, DEFAULT_IMAGE_BUCKET);
        assert_eq!(config.content_mode, ContentMode::Stream);
        assert_eq!(config.persist, PersistStrategy::InsertWhenReady);
        assert_eq!(config.db_max_connections, 8);
        assert_eq!(config.openai.content_model, DEFAULT_CONTENT_MODEL);
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let pairs: Vec<_> = BASE.iter().copied().filter(|(k, _)| *k != "OPENAI_API_KEY").collect();
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("OPENAI_API_KEY")));
    }

    #[test]
    fn blank_storage_key_is_fatal() {
        let mut pairs = BASE.to_vec();
        pairs.retain(|(k, _)| *k != "STORAGE_SERVICE_KEY");
        pairs.push(("STORAGE_SERVICE_KEY", "   "));
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn unknown_content_mode_is_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("CONTENT_MODE", "batch"));
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = BASE.to_vec();
        pairs.push(("CONTENT_MODE", "single_shot"));
        pairs.push(("SLIDE_PERSIST", "placeholder"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.content_mode, ContentMode::SingleShot);
        assert_eq!(config.persist, PersistStrategy::PlaceholderThenUpdate);
    }
}
