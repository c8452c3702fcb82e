// src/services/object_store.rs
// DOCUMENTATION: Object storage client for uploaded images
// PURPOSE: Best-effort deletion of the object backing a removed photo

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::config::Config;
use crate::errors::PortfolioError;
use crate::models::Photo;

/// Delete-by-key access to the image bucket
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn delete_object(&self, key: &str) -> Result<(), PortfolioError>;
}

/// Object store reached through an HTTP gateway: `DELETE {endpoint}/{bucket}/{key}`
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: String, bucket: String, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket,
            token,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn delete_object(&self, key: &str) -> Result<(), PortfolioError> {
        let mut request = self.client.delete(self.object_url(key));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PortfolioError::StorageError(format!("Request failed: {}", e)))?;

        let status = response.status();
        // Already gone counts as deleted
        if status.is_success() || status == StatusCode::NOT_FOUND {
            log::debug!("Deleted object {} ({})", key, status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(PortfolioError::StorageError(format!("HTTP {} - {}", status, body)))
    }
}

/// Used when no storage endpoint is configured
pub struct DisabledObjectStore;

#[async_trait]
impl ObjectStore for DisabledObjectStore {
    async fn delete_object(&self, key: &str) -> Result<(), PortfolioError> {
        Err(PortfolioError::StorageError(format!(
            "object storage not configured, left {} in place",
            key
        )))
    }
}

/// Build the store described by the configuration
pub fn object_store_from_config(config: &Config) -> Arc<dyn ObjectStore> {
    if config.storage_enabled() {
        Arc::new(HttpObjectStore::new(
            config.storage_endpoint.clone(),
            config.storage_bucket.clone(),
            config.storage_token.clone(),
        ))
    } else {
        Arc::new(DisabledObjectStore)
    }
}

/// Delete the image behind `photo`, logging instead of failing
/// DOCUMENTATION: The metadata row is already gone when this runs; a failure
/// here leaves an orphaned object and is only ever logged.
pub async fn delete_backing_object(store: &dyn ObjectStore, photo: &Photo) {
    let key = match photo.storage_key() {
        Some(key) => key,
        None => {
            log::warn!("Photo {} has no usable object key in url {}", photo.id, photo.url);
            return;
        }
    };

    match store.delete_object(&key).await {
        Ok(()) => log::info!("Deleted object {} for photo {}", key, photo.id),
        Err(e) => log::warn!("Object delete failed for photo {}: {}", photo.id, e),
    }
}

/// Fire-and-forget variant of [`delete_backing_object`]
pub fn spawn_backing_object_delete(store: Arc<dyn ObjectStore>, photo: Photo) {
    tokio::spawn(async move {
        delete_backing_object(store.as_ref(), &photo).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::test_config;
    use crate::models::photo::sample_photo;
    use std::sync::Mutex;

    /// Records keys and optionally fails every delete
    #[derive(Default)]
    struct RecordingStore {
        keys: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ObjectStore for RecordingStore {
        async fn delete_object(&self, key: &str) -> Result<(), PortfolioError> {
            self.keys.lock().unwrap().push(key.to_string());
            if self.fail {
                Err(PortfolioError::StorageError("bucket offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_delete_uses_url_path_as_key() {
        let store = RecordingStore::default();
        delete_backing_object(&store, &sample_photo()).await;

        assert_eq!(
            *store.keys.lock().unwrap(),
            vec!["photography/photos/IMG_0001.jpg".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_failure_is_swallowed() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };

        // Returns normally even though the store errors
        delete_backing_object(&store, &sample_photo()).await;
        assert_eq!(store.keys.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_url_skips_store() {
        let store = RecordingStore::default();
        let mut photo = sample_photo();
        photo.url = "::".to_string();

        delete_backing_object(&store, &photo).await;
        assert!(store.keys.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_store_reports_error() {
        let store = object_store_from_config(&test_config());
        let result = store.delete_object("a.jpg").await;
        tokio_test::assert_err!(result);
    }

    #[test]
    fn test_object_url() {
        let store = HttpObjectStore::new(
            "https://storage.example.com/".to_string(),
            "photos".to_string(),
            None,
        );
        assert_eq!(
            store.object_url("/2024/a.jpg"),
            "https://storage.example.com/photos/2024/a.jpg"
        );
    }
}
